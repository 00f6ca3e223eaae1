use std::fmt::{self, Debug};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use sgp4::{Classification, Constants, Elements, MinutesSinceEpoch};

use crate::config::MU;
use crate::error::{Error, Result};
use crate::transform;

#[cfg(feature = "web")]
use {crate::config::CELESTRAK_URL, tracing::info};

#[derive(Clone, Debug, PartialEq)]
pub struct Tle {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl Tle {
    /// Reads the first element set in `text`, with or without a name line.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        match lines.as_slice() {
            [l1, l2, ..] if l1.starts_with("1 ") && l2.starts_with("2 ") => Ok(Self {
                name: None,
                line1: l1.to_string(),
                line2: l2.to_string(),
            }),
            [name, l1, l2, ..] if l1.starts_with("1 ") && l2.starts_with("2 ") => Ok(Self {
                name: Some(name.trim_start_matches("0 ").to_string()),
                line1: l1.to_string(),
                line2: l2.to_string(),
            }),
            _ => Err(Error::Tle("expected a 2 or 3 line element set".into())),
        }
    }
}

pub struct Satellite {
    pub tle: Tle,
    pub elements: Elements,
    pub constants: Constants,
}

impl Debug for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satellite")
            .field("name", &self.name())
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

pub struct GeoPrediction {
    /// Longitude deg, latitude deg, altitude km
    pub position: (f64, f64, f64),
    /// TEME position, km
    pub eci: [f64; 3],
    /// km/h
    pub speed: f64,
    pub gmst: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub struct OrbitSummary {
    pub name: String,
    pub norad_id: u64,
    pub classification: &'static str,
    pub launch_year: Option<i32>,
    pub epoch: DateTime<Utc>,
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub argument_of_perigee_deg: f64,
    pub period_minutes: f64,
}

impl Satellite {
    #[cfg(feature = "web")]
    pub fn from_norad_cat(id: u64) -> Result<Self> {
        let text = reqwest::blocking::get(format!("{CELESTRAK_URL}?CATNR={id}&FORMAT=TLE"))?
            .error_for_status()?
            .text()?;
        info!("Fetched TLE for {id} from celestrak.org");
        Self::from_tle(Tle::parse(&text)?)
    }

    pub fn from_tle(tle: Tle) -> Result<Self> {
        let elements = Elements::from_tle(
            tle.name.clone(),
            tle.line1.as_bytes(),
            tle.line2.as_bytes(),
        )
        .map_err(|e| Error::Tle(e.to_string()))?;

        let constants =
            Constants::from_elements(&elements).map_err(|e| Error::Tle(e.to_string()))?;

        Ok(Self {
            tle,
            elements,
            constants,
        })
    }

    pub fn name(&self) -> String {
        match &self.elements.object_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("NORAD {}", self.elements.norad_id),
        }
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.elements.datetime)
    }

    /// Fractional days from the TLE epoch to `time`, negative before it.
    pub fn days_since_epoch<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> f64 {
        let elapsed = time.with_timezone(&Utc).signed_duration_since(self.epoch());
        elapsed.num_milliseconds() as f64 / 86_400_000.0
    }

    pub fn period_minutes(&self) -> f64 {
        1440.0 / self.elements.mean_motion
    }

    pub fn predict(&self, time: &DateTime<FixedOffset>) -> Result<GeoPrediction> {
        let epoch = time.offset().from_utc_datetime(&self.elements.datetime);
        let elapsed_ms = time.signed_duration_since(epoch).num_milliseconds() as f64;

        let prediction = self
            .constants
            .propagate(MinutesSinceEpoch(elapsed_ms / 60_000.0))
            .map_err(|e| Error::Propagation(e.to_string()))?;

        let gmst = sgp4::iau_epoch_to_sidereal_time(
            self.elements.epoch() + elapsed_ms / (31_557_600.0 * 1000.0),
        );

        let [x, y, z] = prediction.position;
        let position = transform::eci_to_geodetic(x, y, z, gmst);

        let v = prediction.velocity;
        let speed = (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt() * 3.6e3; // km/s to km/h

        Ok(GeoPrediction {
            position,
            eci: prediction.position,
            speed,
            gmst,
        })
    }

    /// Two digit launch year from the international designator, pivoting at 57.
    pub fn launch_year(&self) -> Option<i32> {
        let yy: i32 = self.tle.line1.get(9..11)?.trim().parse().ok()?;
        Some(if yy < 57 { yy + 2000 } else { yy + 1900 })
    }

    pub fn summary(&self) -> OrbitSummary {
        let period_minutes = self.period_minutes();
        let period_seconds = period_minutes * 60.0;
        let semi_major_axis_km =
            (MU * (period_seconds / (2.0 * std::f64::consts::PI)).powi(2)).cbrt();

        OrbitSummary {
            name: self.name(),
            norad_id: self.elements.norad_id,
            classification: match self.elements.classification {
                Classification::Unclassified => "Unclassified",
                Classification::Classified => "Classified",
                Classification::Secret => "Secret",
            },
            launch_year: self.launch_year(),
            epoch: self.epoch(),
            semi_major_axis_km,
            eccentricity: self.elements.eccentricity,
            inclination_deg: self.elements.inclination,
            raan_deg: self.elements.right_ascension,
            argument_of_perigee_deg: self.elements.argument_of_perigee,
            period_minutes,
        }
    }
}
