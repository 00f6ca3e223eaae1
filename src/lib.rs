pub mod config;
pub mod error;
pub mod freshness;
pub mod ground_track;
pub mod observer;
pub mod pass;
pub mod satellite;
pub mod search;
pub mod segment;
pub mod sunlit;
pub mod transform;

pub use error::{Error, Result};
pub use ground_track::{Direction, GroundTrack, GroundTrackPlot, GroundTrackRequest, PlotColors};
pub use observer::Observer;
pub use pass::Pass;
pub use satellite::{Satellite, Tle};
pub use segment::{segment, Sample, Segment, SegmentedTrack, Track};
pub use sunlit::SunStatus;
