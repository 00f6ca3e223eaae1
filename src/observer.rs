use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::transform::Geodetic;

#[cfg(feature = "web")]
use {
    serde::Deserialize,
    tracing::{info, warn},
};

/// Time zone offsets offered to users, in whole hours.
pub const TZ_OFFSET_RANGE: std::ops::RangeInclusive<f64> = -12.0..=14.0;

#[derive(Clone, Debug)]
pub struct Observer {
    pub lat: f64,
    pub lon: f64,
    /// Meters MSL
    pub elev: f64,
    pub time: DateTime<FixedOffset>,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            lat: 0.0,
            lon: 0.0,
            elev: 0.0,
            time: Utc::now().into(),
        }
    }
}

#[cfg(feature = "web")]
#[derive(Deserialize)]
struct IpInfo {
    loc: String,
}

#[cfg(feature = "web")]
#[derive(Deserialize)]
struct TopoData {
    results: [TopoResults; 1],
}

#[cfg(feature = "web")]
#[derive(Deserialize)]
struct TopoResults {
    elevation: f64,
}

impl Observer {
    #[cfg(feature = "web")]
    pub fn from_ip() -> Result<Self> {
        let info: IpInfo = reqwest::blocking::get("https://ipinfo.io/json")?.json()?;
        let mut parts = info.loc.split_terminator(',').map(|s| s.trim().parse::<f64>());
        let (Some(Ok(lat)), Some(Ok(lon))) = (parts.next(), parts.next()) else {
            return Err(Error::invalid(format!(
                "could not read a location from \"{}\"",
                info.loc
            )));
        };
        info!("Got a location of {lat}, {lon} from https://ipinfo.io");

        let elev = match reqwest::blocking::get(format!(
            "https://api.opentopodata.org/v1/etopo1?locations={lat},{lon}"
        ))
        .and_then(|res| res.json::<TopoData>())
        {
            Ok(topo) => {
                let elev = topo.results[0].elevation;
                info!("Got an elevation of {elev}m from https://opentopodata.org");
                elev
            }
            Err(e) => {
                warn!("Failed to get elevation from https://opentopodata.org: {e}");
                0.0
            }
        };

        Ok(Self::validated(lat, lon)?.with_elevation(elev))
    }

    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elev: 0.0,
            time: Utc::now().into(),
        }
    }

    /// Like [`Observer::from_lat_lon`] but refuses coordinates off the globe.
    pub fn validated(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || lat.abs() > 90.0 {
            return Err(Error::invalid(format!("latitude {lat} is out of range")));
        }
        if !lon.is_finite() || lon.abs() > 180.0 {
            return Err(Error::invalid(format!("longitude {lon} is out of range")));
        }
        Ok(Self::from_lat_lon(lat, lon))
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elev = elevation;
        self
    }

    pub fn with_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = time;
        self
    }

    pub fn with_current_time(self) -> Self {
        let offset = *self.time.offset();
        self.with_time(Utc::now().with_timezone(&offset))
    }

    pub fn position(&self) -> Geodetic {
        Geodetic {
            lon: self.lon,
            lat: self.lat,
            alt: self.elev,
        }
    }
}

/// Combines a `YYYY-MM-DD` date, an `HH:MM` or `HH:MM:SS` wall-clock time and
/// a UTC offset in hours into a single instant.
pub fn observation_time(date: &str, time: &str, tz_hours: f64) -> Result<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| Error::invalid(format!("date \"{date}\": {e}")))?;

    let time = time.trim();
    let time = match time.len() {
        5 => NaiveTime::parse_from_str(time, "%H:%M"),
        _ => NaiveTime::parse_from_str(time, "%H:%M:%S"),
    }
    .map_err(|e| Error::invalid(format!("time \"{time}\": {e}")))?;

    let offset = utc_offset(tz_hours)?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| Error::invalid("ambiguous local time"))
}

pub fn utc_offset(tz_hours: f64) -> Result<FixedOffset> {
    if !TZ_OFFSET_RANGE.contains(&tz_hours) {
        return Err(Error::invalid(format!(
            "UTC offset {tz_hours} h is outside -12..=14"
        )));
    }
    let seconds = (tz_hours * 3600.0).round() as i32;
    FixedOffset::east_opt(seconds)
        .ok_or_else(|| Error::invalid(format!("UTC offset {tz_hours} h")))
}
