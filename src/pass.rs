use std::fmt;

use chrono::{DateTime, Duration, FixedOffset};
use tracing::debug;

use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::satellite::Satellite;
use crate::transform::{self, Geodetic, LookAngles};

const COARSE_STEP_SECONDS: i64 = 60;
const FINE_STEP_SECONDS: i64 = 1;
const HORIZON_ELEVATION: f64 = 0.0;

pub const DEFAULT_SEARCH_WINDOW_HOURS: i64 = 72;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub struct Pass {
    pub satellite: String,
    pub aos: DateTime<FixedOffset>,
    pub los: DateTime<FixedOffset>,
    pub tca: DateTime<FixedOffset>,
    pub max_elevation_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub duration_seconds: i64,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The next pass of {} begins at {} (azimuth {:.1} deg), peaks at {:.1} deg elevation at {} and ends at {} (azimuth {:.1} deg).",
            self.satellite,
            self.aos.format("%Y-%m-%d %H:%M:%S %:z"),
            self.aos_azimuth_deg,
            self.max_elevation_deg,
            self.tca.format("%H:%M:%S"),
            self.los.format("%H:%M:%S"),
            self.los_azimuth_deg,
        )
    }
}

/// Pass search window from a user-supplied hour count.
pub fn search_window(hours: i64) -> Result<Duration> {
    match Duration::try_hours(hours) {
        Some(window) if hours > 0 => Ok(window),
        _ => Err(Error::invalid(format!("search window of {hours} hours is out of range"))),
    }
}

/// Azimuth, elevation and range of `satellite` from `observer` at `time`.
pub fn look(
    satellite: &Satellite,
    observer: &Observer,
    time: &DateTime<FixedOffset>,
) -> Result<LookAngles> {
    let (lon, lat, alt_km) = satellite.predict(time)?.position;
    let target = Geodetic {
        lon,
        lat,
        alt: alt_km * 1e3,
    };
    Ok(transform::look_angles(&observer.position(), &target))
}

/// First pass after `observer.time` whose peak reaches `min_elevation`.
///
/// Negative minimums are clamped to the horizon. A pass already under way at
/// the start time is reported with its AOS at the start time.
pub fn next_pass(
    satellite: &Satellite,
    observer: &Observer,
    min_elevation: f64,
    window: Duration,
) -> Result<Pass> {
    if !min_elevation.is_finite() || min_elevation > 90.0 {
        return Err(Error::invalid(format!(
            "minimum elevation {min_elevation} must be at most 90 deg"
        )));
    }
    let min_elevation = min_elevation.max(0.0);

    let start = observer.time;
    let end = start
        .checked_add_signed(window)
        .ok_or_else(|| Error::invalid("pass search window runs past the end of time"))?;
    let step = Duration::seconds(COARSE_STEP_SECONDS);

    let mut cursor = start;
    let mut aos: Option<(DateTime<FixedOffset>, f64)> = None;
    let mut peak = (start, f64::MIN);

    while cursor <= end {
        let angles = look(satellite, observer, &cursor)?;
        let visible = angles.elevation >= HORIZON_ELEVATION;

        match (aos, visible) {
            (None, true) => {
                aos = Some(if cursor == start {
                    (start, angles.azimuth)
                } else {
                    refine_crossing(satellite, observer, cursor - step, cursor, true)?
                });
                peak = (cursor, angles.elevation);
            }
            (Some(_), true) if angles.elevation > peak.1 => peak = (cursor, angles.elevation),
            (Some((aos_time, aos_az)), false) => {
                let (los_time, los_az) =
                    refine_crossing(satellite, observer, cursor - step, cursor, false)?;
                if peak.1 >= min_elevation {
                    return Ok(pass(satellite, (aos_time, aos_az), (los_time, los_az), peak));
                }
                debug!("Skipping pass at {aos_time} peaking at {:.1} deg", peak.1);
                aos = None;
            }
            _ => {}
        }

        cursor += step;
    }

    // still above the horizon when the window closes
    if let Some(aos) = aos {
        if peak.1 >= min_elevation {
            let los_az = look(satellite, observer, &end)?.azimuth;
            return Ok(pass(satellite, aos, (end, los_az), peak));
        }
    }

    Err(Error::NoPass {
        min_elevation,
        window_hours: window.num_hours(),
    })
}

fn pass(
    satellite: &Satellite,
    aos: (DateTime<FixedOffset>, f64),
    los: (DateTime<FixedOffset>, f64),
    peak: (DateTime<FixedOffset>, f64),
) -> Pass {
    Pass {
        satellite: satellite.name(),
        aos: aos.0,
        los: los.0,
        tca: peak.0,
        max_elevation_deg: round2(peak.1),
        aos_azimuth_deg: round2(aos.1),
        los_azimuth_deg: round2(los.1),
        duration_seconds: (los.0 - aos.0).num_seconds(),
    }
}

/// Bisects a horizon crossing between `before` and `after` down to a second.
fn refine_crossing(
    satellite: &Satellite,
    observer: &Observer,
    before: DateTime<FixedOffset>,
    after: DateTime<FixedOffset>,
    rising: bool,
) -> Result<(DateTime<FixedOffset>, f64)> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = look(satellite, observer, &mid)?.elevation >= HORIZON_ELEVATION;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    let azimuth = look(satellite, observer, &high)?.azimuth;
    Ok((high, azimuth))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
