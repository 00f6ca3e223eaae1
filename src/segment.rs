//! Splitting a ground track into polylines at antimeridian crossings.
//!
//! A chart drawing a longitude/latitude polyline joins consecutive points with
//! straight lines, so a track that wraps from +180 to -180 would be drawn as a
//! line across the whole map. [`segment`] breaks the track wherever two
//! consecutive longitudes differ by more than a threshold.

use crate::error::{Error, Result};

#[cfg(feature = "web")]
use serde::Serialize;

/// One (longitude, latitude) point of a ground track, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct Sample {
    pub lon: f64,
    pub lat: f64,
}

impl Sample {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// Time-ordered samples of a ground track.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct Track(pub Vec<Sample>);

pub type Segment = Vec<Sample>;

pub type SegmentedTrack = Vec<Segment>;

impl Track {
    /// Builds a track from the parallel coordinate arrays a propagator hands
    /// back. Mismatched lengths and non-finite values are rejected rather than
    /// trimmed.
    pub fn from_parallel(longitudes: &[f64], latitudes: &[f64]) -> Result<Self> {
        if longitudes.len() != latitudes.len() {
            return Err(Error::invalid(format!(
                "{} longitudes but {} latitudes",
                longitudes.len(),
                latitudes.len()
            )));
        }

        longitudes
            .iter()
            .zip(latitudes)
            .enumerate()
            .map(|(i, (&lon, &lat))| {
                if lon.is_finite() && lat.is_finite() {
                    Ok(Sample { lon, lat })
                } else {
                    Err(Error::invalid(format!(
                        "sample {i} is not a finite coordinate ({lon}, {lat})"
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn longitudes(&self) -> Vec<f64> {
        self.0.iter().map(|s| s.lon).collect()
    }

    pub fn latitudes(&self) -> Vec<f64> {
        self.0.iter().map(|s| s.lat).collect()
    }
}

impl FromIterator<Sample> for Track {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Splits `track` wherever `|lon[i] - lon[i-1]| > wrap_threshold`.
///
/// The difference is the raw numeric one, not the shortest arc: a step from
/// -179 to 179 counts as 358 degrees. Coordinates are not range checked.
/// Concatenating the returned segments gives back the input exactly.
pub fn segment(track: &Track, wrap_threshold: f64) -> SegmentedTrack {
    let mut segments = SegmentedTrack::new();
    let Some((first, rest)) = track.samples().split_first() else {
        return segments;
    };

    let mut current = vec![*first];
    let mut prev = first;
    for sample in rest {
        if (sample.lon - prev.lon).abs() > wrap_threshold {
            segments.push(std::mem::take(&mut current));
        }
        current.push(*sample);
        prev = sample;
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
