//! Time and astronomical calculations.
//!
//! Provides Greenwich Mean Sidereal Time (GMST) for rotating inertial
//! satellite positions into the Earth-fixed frame, and the subsolar
//! point used by the day/night shading layer.

use chrono::{DateTime, Datelike, Utc};

pub const SECONDS_PER_DAY: f64 = 86400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
pub const GMST_BASE_DEG: f64 = 280.46061837;
pub const GMST_ROTATION_PER_DAY: f64 = 360.98564736629;
pub const GMST_CORRECTION: f64 = 0.000387933;
pub const SOLAR_DECLINATION_MAX: f64 = -23.45;
pub const DAYS_PER_YEAR: f64 = 365.0;

// 2000-01-01T12:00:00Z as a Unix timestamp.
const J2000_TIMESTAMP: i64 = 946_728_000;

pub fn greenwich_mean_sidereal_time(timestamp: DateTime<Utc>) -> f64 {
    let j2000 = DateTime::from_timestamp(J2000_TIMESTAMP, 0).unwrap_or_default();
    let days_since_j2000 =
        (timestamp - j2000).num_milliseconds() as f64 / (1000.0 * SECONDS_PER_DAY);
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38710000.0;
    let gmst_normalized = gmst_degrees.rem_euclid(360.0);
    gmst_normalized.to_radians()
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn normalize_lon_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Latitude and longitude (degrees) of the point directly beneath the Sun.
///
/// Uses the day-of-year declination approximation and an equinox-anchored
/// right ascension, good to a couple of degrees.
pub fn subsolar_point(timestamp: DateTime<Utc>) -> (f64, f64) {
    let day_of_year = timestamp.ordinal() as f64;
    let declination: f64 = SOLAR_DECLINATION_MAX
        * ((360.0 / DAYS_PER_YEAR) * (day_of_year + 10.0)).to_radians().cos();
    let sun_ra_deg = (day_of_year - 80.0) * 360.0 / 365.0;
    let gmst_deg = greenwich_mean_sidereal_time(timestamp).to_degrees();
    (declination, normalize_lon_deg(sun_ra_deg - gmst_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn gmst_at_j2000_epoch() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let gmst = greenwich_mean_sidereal_time(t).to_degrees();
        assert!((gmst - GMST_BASE_DEG).abs() < 1e-6);
    }

    #[test]
    fn gmst_advances_just_under_one_degree_per_day() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let g0 = greenwich_mean_sidereal_time(t0).to_degrees();
        let g1 = greenwich_mean_sidereal_time(t1).to_degrees();
        let advance = (g1 - g0).rem_euclid(360.0);
        assert!((advance - (GMST_ROTATION_PER_DAY - 360.0)).abs() < 1e-6);
    }

    #[test]
    fn normalize_lon_wraps_into_range() {
        assert_eq!(normalize_lon_deg(0.0), 0.0);
        assert_eq!(normalize_lon_deg(190.0), -170.0);
        assert_eq!(normalize_lon_deg(-190.0), 170.0);
        assert_eq!(normalize_lon_deg(540.0), -180.0);
    }

    #[test]
    fn subsolar_latitude_follows_the_seasons() {
        let december = Utc.with_ymd_and_hms(2025, 12, 21, 12, 0, 0).unwrap();
        let june = Utc.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap();
        let (lat_dec, _) = subsolar_point(december);
        let (lat_jun, _) = subsolar_point(june);
        assert!(lat_dec < -20.0);
        assert!(lat_jun > 20.0);
    }

    #[test]
    fn subsolar_longitude_near_zero_at_noon_utc() {
        let t = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let (_, lon) = subsolar_point(t);
        assert!(lon.abs() < 10.0, "subsolar lon at noon UT was {}", lon);
    }
}
