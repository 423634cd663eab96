//! Ground-track propagation and visibility sampling.
//!
//! Turns the SGP4 state at a sequence of times into sub-satellite
//! points on the Earth-fixed frame, samples satellite elevation over a
//! grid of ground sites, and assembles the complete scene one redraw
//! shows.

use chrono::{DateTime, Duration, Utc};

use crate::config::{AppContext, SLIDER_MAX, SLIDER_MIN};
use crate::events::{self, EventMarker};
use crate::time::{greenwich_mean_sidereal_time, normalize_lon_deg};
use crate::tle::Satellite;

pub const TRACK_SAMPLES: usize = 100;
pub const GRID_DIM: usize = 60;
pub const GRID_HALF_SPAN_DEG: f64 = 30.0;

pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.135;
pub const EARTH_FLATTENING: f64 = 1.0 / 298.26;

/// One sub-satellite point of the ground track.
pub struct TrackSample {
    pub time: DateTime<Utc>,
    pub lon_deg: f64,
    pub lat_deg: f64,
}

/// Satellite elevation angles over a 1-degree-spaced grid of ground
/// sites centered on the first track sample.
pub struct VisibilityGrid {
    pub center_lon: f64,
    pub center_lat: f64,
    elevations: Vec<f64>,
}

impl VisibilityGrid {
    pub fn elevation_deg(&self, lon_idx: usize, lat_idx: usize) -> f64 {
        self.elevations[lon_idx * GRID_DIM + lat_idx]
    }

    pub fn node_lon(&self, lon_idx: usize) -> f64 {
        self.center_lon + (lon_idx as f64 - GRID_HALF_SPAN_DEG)
    }

    pub fn node_lat(&self, lat_idx: usize) -> f64 {
        self.center_lat + (lat_idx as f64 - GRID_HALF_SPAN_DEG)
    }
}

/// Everything one redraw of the map displays, rebuilt from scratch on
/// every controller run.
pub struct MapScene {
    pub origin: DateTime<Utc>,
    pub track: Vec<TrackSample>,
    pub visibility: VisibilityGrid,
    pub event_markers: Vec<EventMarker>,
    pub stale_events: bool,
}

fn earth_fixed(position_teme: &[f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        position_teme[0] * cos_g + position_teme[1] * sin_g,
        -position_teme[0] * sin_g + position_teme[1] * cos_g,
        position_teme[2],
    ]
}

fn geodetic_latitude_deg(r_xy: f64, z: f64) -> f64 {
    let e2 = 2.0 * EARTH_FLATTENING - EARTH_FLATTENING * EARTH_FLATTENING;
    let mut lat = z.atan2(r_xy);
    for _ in 0..10 {
        let previous = lat;
        let c = 1.0 / (1.0 - e2 * previous.sin().powi(2)).sqrt();
        lat = (z + EARTH_EQUATORIAL_RADIUS_KM * c * e2 * previous.sin()).atan2(r_xy);
        if (lat - previous).abs().to_degrees() < 1e-5 {
            break;
        }
    }
    lat.to_degrees()
}

fn lat_lon_of(earth_fixed_km: &[f64; 3]) -> (f64, f64) {
    let lon = normalize_lon_deg(earth_fixed_km[1].atan2(earth_fixed_km[0]).to_degrees());
    let r_xy =
        (earth_fixed_km[0] * earth_fixed_km[0] + earth_fixed_km[1] * earth_fixed_km[1]).sqrt();
    (lon, geodetic_latitude_deg(r_xy, earth_fixed_km[2]))
}

fn propagate_earth_fixed(sat: &Satellite, time: DateTime<Utc>) -> Result<[f64; 3], String> {
    let minutes_since_epoch = time.timestamp() as f64 / 60.0 - sat.epoch_minutes;
    let prediction = sat
        .constants
        .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch))
        .map_err(|e| format!("propagation failed at {}: {}", time, e))?;
    Ok(earth_fixed(&prediction.position, greenwich_mean_sidereal_time(time)))
}

/// Sub-satellite points at one-minute steps starting at `origin`.
pub fn ground_track(sat: &Satellite, origin: DateTime<Utc>) -> Result<Vec<TrackSample>, String> {
    let mut track = Vec::with_capacity(TRACK_SAMPLES);
    for i in 0..TRACK_SAMPLES as i64 {
        let time = origin + Duration::minutes(i);
        let position = propagate_earth_fixed(sat, time)?;
        let (lon_deg, lat_deg) = lat_lon_of(&position);
        track.push(TrackSample { time, lon_deg, lat_deg });
    }
    Ok(track)
}

/// Earth-fixed position of a ground site at sea level.
pub fn site_position(lat_deg: f64, lon_deg: f64) -> [f64; 3] {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    [
        EARTH_EQUATORIAL_RADIUS_KM * lat.cos() * lon.cos(),
        EARTH_EQUATORIAL_RADIUS_KM * lat.cos() * lon.sin(),
        EARTH_EQUATORIAL_RADIUS_KM * lat.sin(),
    ]
}

/// Elevation of the satellite above the site's local horizon, degrees.
pub fn elevation_angle_deg(site: [f64; 3], sat: [f64; 3]) -> f64 {
    let r = (site[0] * site[0] + site[1] * site[1] + site[2] * site[2]).sqrt();
    let ux = site[0] / r;
    let uy = site[1] / r;
    let uz = site[2] / r;
    let dx = sat[0] - site[0];
    let dy = sat[1] - site[1];
    let dz = sat[2] - site[2];
    let dist = (dx * dx + dy * dy + dz * dz).sqrt();
    if dist < 1e-9 {
        return 90.0;
    }
    let dot = ux * dx + uy * dy + uz * dz;
    (dot / dist).asin().to_degrees()
}

/// Elevation angles seen from sites on a GRID_DIM x GRID_DIM grid
/// around (`center_lon`, `center_lat`), all at the single time `origin`.
pub fn visibility_grid(
    sat: &Satellite,
    origin: DateTime<Utc>,
    center_lon: f64,
    center_lat: f64,
) -> Result<VisibilityGrid, String> {
    let sat_position = propagate_earth_fixed(sat, origin)?;
    let mut elevations = Vec::with_capacity(GRID_DIM * GRID_DIM);
    for i in 0..GRID_DIM {
        let lon = center_lon + (i as f64 - GRID_HALF_SPAN_DEG);
        for j in 0..GRID_DIM {
            let lat = center_lat + (j as f64 - GRID_HALF_SPAN_DEG);
            elevations.push(elevation_angle_deg(site_position(lat, lon), sat_position));
        }
    }
    Ok(VisibilityGrid { center_lon, center_lat, elevations })
}

/// The update controller: one full recomputation of the map contents
/// for the given slider offset.
pub fn build_scene(ctx: &AppContext, offset_minutes: i64) -> Result<MapScene, String> {
    let offset = offset_minutes.clamp(SLIDER_MIN, SLIDER_MAX);
    let origin = Utc::now() + Duration::minutes(offset);
    let track = ground_track(&ctx.satellite, origin)?;
    let visibility = visibility_grid(&ctx.satellite, origin, track[0].lon_deg, track[0].lat_deg)?;
    let (event_markers, stale_events) = match &ctx.events {
        Some(events) => events::match_events(events, &track),
        None => (Vec::new(), false),
    };
    Ok(MapScene { origin, track, visibility, event_markers, stale_events })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use chrono::TimeZone;

    fn test_satellite() -> Satellite {
        crate::tle::satellite_from_tle(
            config::SATELLITE_NAME,
            config::TLE_LINE1,
            config::TLE_LINE2,
        )
        .unwrap()
    }

    #[test]
    fn track_is_100_samples_one_minute_apart() {
        let sat = test_satellite();
        let origin = Utc.with_ymd_and_hms(2025, 3, 1, 6, 30, 45).unwrap();
        let track = ground_track(&sat, origin).unwrap();
        assert_eq!(track.len(), TRACK_SAMPLES);
        assert_eq!(track[0].time, origin);
        for pair in track.windows(2) {
            assert_eq!((pair[1].time - pair[0].time).num_seconds(), 60);
        }
    }

    #[test]
    fn track_stays_within_inclination_band() {
        let sat = test_satellite();
        let origin = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let track = ground_track(&sat, origin).unwrap();
        for sample in &track {
            assert!(sample.lat_deg.abs() <= sat.inclination_deg + 0.5);
            assert!(sample.lon_deg >= -180.0 && sample.lon_deg < 180.0);
        }
    }

    #[test]
    fn geodetic_latitude_matches_reference_state() {
        // ECEF state with a known geodetic latitude of 44.91 degrees.
        let r_xy = (4400.594_f64 * 4400.594 + 1932.870 * 1932.870).sqrt();
        let lat = geodetic_latitude_deg(r_xy, 4760.712);
        assert!((lat - 44.9077).abs() < 1e-3, "lat was {}", lat);
    }

    #[test]
    fn elevation_is_90_directly_overhead() {
        let site = site_position(10.0, 20.0);
        let sat = [site[0] * 1.1, site[1] * 1.1, site[2] * 1.1];
        assert!(elevation_angle_deg(site, sat) > 89.9);
    }

    #[test]
    fn elevation_is_negative_for_antipodal_satellite() {
        let site = site_position(10.0, 20.0);
        let sat = [-site[0] * 1.1, -site[1] * 1.1, -site[2] * 1.1];
        assert!(elevation_angle_deg(site, sat) < 0.0);
    }

    #[test]
    fn grid_is_centered_on_the_given_point() {
        let sat = test_satellite();
        let origin = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let track = ground_track(&sat, origin).unwrap();
        let grid = visibility_grid(&sat, origin, track[0].lon_deg, track[0].lat_deg).unwrap();
        assert_eq!(grid.elevations.len(), GRID_DIM * GRID_DIM);
        assert_eq!(grid.node_lon(30), track[0].lon_deg);
        assert_eq!(grid.node_lat(30), track[0].lat_deg);
        assert_eq!(grid.node_lon(0), track[0].lon_deg - 30.0);
        assert_eq!(grid.node_lat(GRID_DIM - 1), track[0].lat_deg + 29.0);
        // The sub-satellite node sees the spacecraft nearly overhead.
        assert!(grid.elevation_deg(30, 30) > 85.0);
    }

    #[test]
    fn scene_offset_is_clamped_to_slider_range() {
        let ctx = AppContext {
            satellite: test_satellite(),
            stations: &config::GROUND_STATIONS,
            events: None,
            zone: None,
            icon: None,
            coastlines: Vec::new(),
        };
        let scene = build_scene(&ctx, SLIDER_MAX + 100_000).unwrap();
        let expected = Utc::now() + Duration::minutes(SLIDER_MAX);
        assert!((scene.origin - expected).num_seconds().abs() < 5);
        assert_eq!(scene.track.len(), TRACK_SAMPLES);
        assert!(scene.event_markers.is_empty());
        assert!(!scene.stale_events);
    }
}
