//! Ground tracks over a whole number of orbital periods, and the chart-ready
//! view built from them.

use chrono::{DateTime, Duration, FixedOffset};
use tracing::{debug, warn};

use crate::config::{
    DEFAULT_SAMPLES_PER_PERIOD, DEFAULT_WRAP_THRESHOLD, MAX_PROPAGATION_DAYS, MAX_TRACK_SAMPLES,
};
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::satellite::Satellite;
use crate::segment::{segment, Sample, Track};

#[cfg(feature = "web")]
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// From the reference time onward
    #[default]
    Forward,
    /// Ending at the reference time
    Backward,
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "forwards" | "f" => Ok(Self::Forward),
            "backward" | "backwards" | "b" => Ok(Self::Backward),
            other => Err(Error::invalid(format!("unknown direction \"{other}\""))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GroundTrackRequest {
    pub reference_time: DateTime<FixedOffset>,
    pub periods: f64,
    pub direction: Direction,
    pub samples_per_period: usize,
}

impl GroundTrackRequest {
    pub fn new(reference_time: DateTime<FixedOffset>, periods: f64) -> Self {
        Self {
            reference_time,
            periods,
            direction: Direction::Forward,
            samples_per_period: DEFAULT_SAMPLES_PER_PERIOD,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_samples_per_period(mut self, samples: usize) -> Self {
        self.samples_per_period = samples;
        self
    }
}

pub struct GroundTrack {
    pub name: String,
    pub track: Track,
    pub times: Vec<DateTime<FixedOffset>>,
    /// Sub-satellite point at the reference time
    pub reference: Sample,
}

/// Propagates `satellite` over `request.periods` orbits either side of the
/// reference time. Samples come back in chronological order whatever the
/// direction.
pub fn generate(satellite: &Satellite, request: &GroundTrackRequest) -> Result<GroundTrack> {
    if !request.periods.is_finite() || request.periods <= 0.0 {
        return Err(Error::invalid(format!(
            "periods must be positive, got {}",
            request.periods
        )));
    }
    if request.samples_per_period < 2 {
        return Err(Error::invalid("at least 2 samples per period are needed"));
    }

    // window check in days first, so oversized spans never reach DateTime arithmetic
    let reference_days = satellite.days_since_epoch(&request.reference_time);
    let span_days = request.periods * satellite.period_minutes() / 1440.0;
    let start_days = match request.direction {
        Direction::Forward => reference_days,
        Direction::Backward => reference_days - span_days,
    };
    for days in [start_days, start_days + span_days] {
        if !days.is_finite() || days.abs() > MAX_PROPAGATION_DAYS {
            warn!("Refusing to propagate {} to {days:.1} days from epoch", satellite.name());
            return Err(Error::OutsidePropagationWindow {
                days: days.abs(),
                max_days: MAX_PROPAGATION_DAYS,
            });
        }
    }

    let intervals = (request.periods * request.samples_per_period as f64).ceil();
    if intervals > MAX_TRACK_SAMPLES as f64 {
        return Err(Error::invalid(format!(
            "{intervals} samples requested, at most {MAX_TRACK_SAMPLES} allowed"
        )));
    }
    let intervals = intervals as usize;

    let span_ms = span_days * 86_400_000.0;
    let start = match request.direction {
        Direction::Forward => request.reference_time,
        Direction::Backward => request.reference_time - Duration::milliseconds(span_ms as i64),
    };
    let end = start + Duration::milliseconds(span_ms as i64);

    let step_ms = span_ms / intervals as f64;
    let times: Vec<_> = (0..=intervals)
        .map(|i| start + Duration::milliseconds((step_ms * i as f64).round() as i64))
        .collect();

    let track = times
        .iter()
        .map(|t| {
            let (lon, lat, _) = satellite.predict(t)?.position;
            Ok(Sample::new(lon, lat))
        })
        .collect::<Result<Track>>()?;

    let (lon, lat, _) = satellite.predict(&request.reference_time)?.position;
    debug!(
        "Generated {} samples for {} from {start} to {end}",
        track.len(),
        satellite.name()
    );

    Ok(GroundTrack {
        name: satellite.name(),
        track,
        times,
        reference: Sample::new(lon, lat),
    })
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct PlotColors {
    pub path: String,
    pub observer: String,
    pub reference: String,
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            path: "#808000".into(),
            observer: "#0000ff".into(),
            reference: "#ff0000".into(),
        }
    }
}

/// One polyline of the track, in the parallel-array shape charting libraries
/// take.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct LineTrace {
    pub name: String,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct Marker {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct GroundTrackPlot {
    pub title: String,
    pub lines: Vec<LineTrace>,
    pub observer: Marker,
    pub reference: Marker,
}

impl GroundTrackPlot {
    pub fn build(
        ground_track: &GroundTrack,
        observer: &Observer,
        colors: &PlotColors,
        wrap_threshold: f64,
    ) -> Self {
        let lines = segment(&ground_track.track, wrap_threshold)
            .into_iter()
            .enumerate()
            .map(|(i, samples)| LineTrace {
                name: format!("Segment {}", i + 1),
                lon: samples.iter().map(|s| s.lon).collect(),
                lat: samples.iter().map(|s| s.lat).collect(),
                color: colors.path.clone(),
            })
            .collect();

        Self {
            title: format!("{} Ground Track", ground_track.name),
            lines,
            observer: Marker {
                name: "Observer".into(),
                lon: observer.lon,
                lat: observer.lat,
                color: colors.observer.clone(),
            },
            reference: Marker {
                name: "Satellite @ Reference".into(),
                lon: ground_track.reference.lon,
                lat: ground_track.reference.lat,
                color: colors.reference.clone(),
            },
        }
    }

    pub fn with_default_threshold(
        ground_track: &GroundTrack,
        observer: &Observer,
        colors: &PlotColors,
    ) -> Self {
        Self::build(ground_track, observer, colors, DEFAULT_WRAP_THRESHOLD)
    }
}
