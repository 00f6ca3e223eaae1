use std::time::Duration;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// TLE search API (paged JSON).
pub const API_URL: &str = "http://tle.ivanstanojevic.me/api/tle";

pub const CELESTRAK_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

/// Sample times further than this from the TLE epoch are refused.
pub const MAX_PROPAGATION_DAYS: f64 = 30.0;

pub const SEARCH_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// How long an admitted satellite's TLE stays cached.
pub const SATELLITE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed by the search API.
pub const RESULTS_PER_PAGE: u32 = 20;

/// Earth's gravitational parameter, km^3/s^2
pub const MU: f64 = 398_600.4418;

/// WGS-84 equatorial radius, km
pub const RE_EQ: f64 = 6378.137;

pub const DEFAULT_WRAP_THRESHOLD: f64 = 180.0;

pub const DEFAULT_SAMPLES_PER_PERIOD: usize = 180;

/// Upper bound on the number of intervals in one generated track.
pub const MAX_TRACK_SAMPLES: usize = 1_000_000;
