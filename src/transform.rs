use std::f64::consts::PI;

use crate::config::RE_EQ;

const FLATTENING: f64 = 1.0 / 298.257_223_563;
const E_SQ: f64 = FLATTENING * (2.0 - FLATTENING);

/// Geodetic position. Angles in degrees, altitude in meters above the WGS-84
/// ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geodetic {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookAngles {
    /// Degrees clockwise from north, [0, 360)
    pub azimuth: f64,
    pub elevation: f64,
    /// Meters
    pub range: f64,
}

/// TEME position (km) to sub-satellite longitude, latitude and altitude (km).
pub fn eci_to_geodetic(x: f64, y: f64, z: f64, gmst: f64) -> (f64, f64, f64) {
    let lon = wrap_pi(y.atan2(x) - gmst).to_degrees();
    let p = x.hypot(y);
    let (lat, alt) = geodetic_latitude(p, z);
    (lon, lat.to_degrees(), alt)
}

fn wrap_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    // rem_euclid maps +PI to -PI
    if wrapped == -PI && angle > 0.0 {
        PI
    } else {
        wrapped
    }
}

/// Iterates latitude from the distance to the polar axis `p` and height `z`
/// (both km). Returns (latitude rad, altitude km).
fn geodetic_latitude(p: f64, z: f64) -> (f64, f64) {
    let mut lat = z.atan2(p * (1.0 - E_SQ));
    let mut n = RE_EQ;
    for _ in 0..10 {
        n = RE_EQ / (1.0 - E_SQ * lat.sin().powi(2)).sqrt();
        let next = (z + E_SQ * n * lat.sin()).atan2(p);
        if (next - lat).abs() < 1e-12 {
            lat = next;
            break;
        }
        lat = next;
    }

    let alt = if lat.cos().abs() > 1e-9 {
        p / lat.cos() - n
    } else {
        z.abs() - n * (1.0 - E_SQ)
    };
    (lat, alt)
}

pub fn llh_to_ecef(lon_radians: f64, lat_radians: f64, height_meters: f64) -> (f64, f64, f64) {
    let a = RE_EQ * 1e3;
    let n = a / (1.0 - E_SQ * lat_radians.sin().powi(2)).sqrt();

    let x = (n + height_meters) * lat_radians.cos() * lon_radians.cos();
    let y = (n + height_meters) * lat_radians.cos() * lon_radians.sin();
    let z = ((1.0 - E_SQ) * n + height_meters) * lat_radians.sin();

    (x, y, z)
}

/// Azimuth, elevation and range of `target` as seen from `observer`, through
/// the observer's local east-north-up frame.
pub fn look_angles(observer: &Geodetic, target: &Geodetic) -> LookAngles {
    let (lon, lat) = (observer.lon.to_radians(), observer.lat.to_radians());
    let (x1, y1, z1) = llh_to_ecef(lon, lat, observer.alt);
    let (x2, y2, z2) = llh_to_ecef(target.lon.to_radians(), target.lat.to_radians(), target.alt);
    let (dx, dy, dz) = (x2 - x1, y2 - y1, z2 - z1);

    let east = -lon.sin() * dx + lon.cos() * dy;
    let north = -lat.sin() * lon.cos() * dx - lat.sin() * lon.sin() * dy + lat.cos() * dz;
    let up = lat.cos() * lon.cos() * dx + lat.cos() * lon.sin() * dy + lat.sin() * dz;

    let range = (dx.powi(2) + dy.powi(2) + dz.powi(2)).sqrt();
    let elevation = up.atan2(east.hypot(north)).to_degrees();
    let azimuth = east.atan2(north).to_degrees().rem_euclid(360.0);

    LookAngles {
        azimuth,
        elevation,
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equatorial_point() {
        let (lon, lat, alt) = eci_to_geodetic(RE_EQ + 400.0, 0.0, 0.0, 0.0);
        assert!(lon.abs() < 1e-9);
        assert!(lat.abs() < 1e-9);
        assert!((alt - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_gmst_rotates_longitude() {
        let (lon, _, _) = eci_to_geodetic(7000.0, 0.0, 0.0, 90f64.to_radians());
        assert!((lon + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_stays_in_range() {
        for step in 0..72 {
            let theta = (step as f64 * 5.0).to_radians();
            let (lon, _, _) =
                eci_to_geodetic(7000.0 * theta.cos(), 7000.0 * theta.sin(), 10.0, 3.0);
            assert!((-180.0..=180.0).contains(&lon), "lon {lon} out of range");
        }
    }

    #[test]
    fn test_geodetic_round_trip_through_ecef() {
        let (x, y, z) = llh_to_ecef(30f64.to_radians(), 45f64.to_radians(), 500_000.0);
        let (lon, lat, alt) = eci_to_geodetic(x / 1e3, y / 1e3, z / 1e3, 0.0);
        assert!((lon - 30.0).abs() < 1e-6);
        assert!((lat - 45.0).abs() < 1e-6);
        assert!((alt - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_overhead_target() {
        let observer = Geodetic {
            lon: 10.0,
            lat: 20.0,
            alt: 0.0,
        };
        let target = Geodetic {
            alt: 400_000.0,
            ..observer
        };
        let look = look_angles(&observer, &target);
        assert!((look.elevation - 90.0).abs() < 1e-6);
        assert!((look.range - 400_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_to_the_north() {
        let observer = Geodetic {
            lon: 0.0,
            lat: 0.0,
            alt: 0.0,
        };
        let target = Geodetic {
            lon: 0.0,
            lat: 5.0,
            alt: 400_000.0,
        };
        let look = look_angles(&observer, &target);
        assert!(look.azimuth < 1e-6 || look.azimuth > 360.0 - 1e-6);
        assert!(look.elevation > 0.0);
    }

    #[test]
    fn test_target_to_the_east() {
        let observer = Geodetic {
            lon: 0.0,
            lat: 0.0,
            alt: 0.0,
        };
        let target = Geodetic {
            lon: 5.0,
            lat: 0.0,
            alt: 400_000.0,
        };
        let look = look_angles(&observer, &target);
        assert!((look.azimuth - 90.0).abs() < 1e-6);
    }
}
