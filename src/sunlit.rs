use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::config::RE_EQ;
use crate::error::Result;
use crate::satellite::Satellite;

const AU_KM: f64 = 149_597_870.7;
const J2000_JD: f64 = 2_451_545.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub enum SunStatus {
    Sunlit,
    Eclipsed,
}

impl fmt::Display for SunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sunlit => write!(f, "be in sunlight"),
            Self::Eclipsed => write!(f, "be in Earth's shadow"),
        }
    }
}

fn julian_date<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    let utc = time.with_timezone(&Utc);
    utc.timestamp_millis() as f64 / 86_400_000.0 + 2_440_587.5
}

/// Geocentric equatorial position of the Sun in km, good to about 0.01 deg
/// between 1950 and 2050.
pub fn sun_position_km<Tz: TimeZone>(time: &DateTime<Tz>) -> [f64; 3] {
    let t = (julian_date(time) - J2000_JD) / 36_525.0;

    let mean_lon = (280.460 + 36_000.771 * t).rem_euclid(360.0);
    let mean_anomaly = (357.529_109_2 + 35_999.050_34 * t).rem_euclid(360.0).to_radians();
    let ecliptic_lon = (mean_lon
        + 1.914_666_471 * mean_anomaly.sin()
        + 0.019_994_643 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let distance_au = 1.000_140_612
        - 0.016_708_617 * mean_anomaly.cos()
        - 0.000_139_589 * (2.0 * mean_anomaly).cos();
    let obliquity = (23.439_291 - 0.013_004_2 * t).to_radians();

    let r = distance_au * AU_KM;
    [
        r * ecliptic_lon.cos(),
        r * obliquity.cos() * ecliptic_lon.sin(),
        r * obliquity.sin() * ecliptic_lon.sin(),
    ]
}

/// Cylindrical shadow test: behind the Earth and within one equatorial radius
/// of the Earth-Sun line.
pub fn in_shadow(position_km: [f64; 3], sun_km: [f64; 3]) -> bool {
    let sun_norm = (sun_km[0].powi(2) + sun_km[1].powi(2) + sun_km[2].powi(2)).sqrt();
    let sun_hat = sun_km.map(|c| c / sun_norm);
    let along = position_km
        .iter()
        .zip(sun_hat)
        .map(|(p, s)| p * s)
        .sum::<f64>();
    if along >= 0.0 {
        return false;
    }
    let r_sq = position_km.iter().map(|p| p * p).sum::<f64>();
    let perpendicular = (r_sq - along * along).max(0.0).sqrt();
    perpendicular < RE_EQ
}

pub fn sun_status(satellite: &Satellite, time: &DateTime<FixedOffset>) -> Result<SunStatus> {
    let eci = satellite.predict(time)?.eci;
    Ok(if in_shadow(eci, sun_position_km(time)) {
        SunStatus::Eclipsed
    } else {
        SunStatus::Sunlit
    })
}
