//! Two-Line Element (TLE) satellite handling.
//!
//! Parses the embedded element set into SGP4 propagation constants.
//! The elements are a fixed snapshot taken at build time; there is no
//! refresh mechanism, so accuracy degrades as the epoch ages.

use sgp4::Constants;

#[derive(Clone)]
pub struct Satellite {
    pub name: String,
    pub constants: Constants,
    pub epoch_minutes: f64,
    pub inclination_deg: f64,
}

pub fn datetime_to_minutes(dt: &sgp4::chrono::NaiveDateTime) -> f64 {
    dt.and_utc().timestamp() as f64 / 60.0
}

/// Build a propagatable satellite from one TLE.
pub fn satellite_from_tle(name: &str, line1: &str, line2: &str) -> Result<Satellite, String> {
    let elements = sgp4::Elements::from_tle(
        Some(name.to_string()),
        line1.trim().as_bytes(),
        line2.trim().as_bytes(),
    )
    .map_err(|e| format!("bad TLE for {}: {}", name, e))?;

    let epoch_minutes = datetime_to_minutes(&elements.datetime);
    let inclination_deg = elements.inclination;
    let constants = Constants::from_elements(&elements)
        .map_err(|e| format!("unusable elements for {}: {}", name, e))?;

    Ok(Satellite {
        name: elements.object_name.unwrap_or_else(|| name.to_string()),
        constants,
        epoch_minutes,
        inclination_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TLE_LINE1, TLE_LINE2, SATELLITE_NAME};

    #[test]
    fn embedded_tle_parses() {
        let sat = satellite_from_tle(SATELLITE_NAME, TLE_LINE1, TLE_LINE2).unwrap();
        assert_eq!(sat.name, SATELLITE_NAME);
        assert!((sat.inclination_deg - 31.0020).abs() < 1e-4);
        // Epoch is day 57.598... of 2025.
        let epoch_2025 = 1_735_689_600.0 / 60.0; // 2025-01-01T00:00:00Z in minutes
        let day_of_year = (sat.epoch_minutes - epoch_2025) / (24.0 * 60.0) + 1.0;
        assert!((day_of_year - 57.59890194).abs() < 1e-4);
    }

    #[test]
    fn garbage_lines_are_rejected() {
        assert!(satellite_from_tle("X", "not a tle", "still not a tle").is_err());
    }
}
