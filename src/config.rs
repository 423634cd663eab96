//! Startup configuration and the process-wide context.
//!
//! Everything decided once at launch lives in AppContext: the tracked
//! satellite, the ground-station roster, and the optional overlays
//! (events, restricted zone, spacecraft icon). The context never
//! changes after construction.

use std::path::Path;

use eframe::egui;

use crate::events::{self, Event};
use crate::geo;
use crate::texture;
use crate::tle::{self, Satellite};

// NORAD snapshot of the tracked spacecraft.
pub const SATELLITE_NAME: &str = "XRISM";
pub const TLE_LINE1: &str =
    "1 57800U 23137A   25057.59890194  .00013364  00000-0  87798-3 0  9999";
pub const TLE_LINE2: &str =
    "2 57800  31.0020 186.8700 0008114 219.6131 140.3913 15.06408680 80934";

// Offset slider span: 5 days back to 10 days ahead, in minutes.
pub const SLIDER_MIN: i64 = -7200;
pub const SLIDER_MAX: i64 = 14400;

pub const UPDATE_INTERVAL_SECS: u64 = 10;

// Fixed file names probed in the working directory at startup.
pub const ZONE_FILE: &str = "saa.conf";
pub const ICON_FILE: &str = "spacecraft.png";

pub struct GroundStation {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    /// (dlon, dlat) offset of the label from the marker.
    pub label_offset: (f64, f64),
    pub color: egui::Color32,
}

pub const GROUND_STATIONS: [GroundStation; 5] = [
    GroundStation {
        name: "USC",
        lat: 31.2513,
        lon: 131.0761,
        label_offset: (1.0, -6.0),
        color: egui::Color32::from_rgb(60, 179, 113),
    },
    GroundStation {
        name: "SNT",
        lat: -33.1333,
        lon: -70.6667,
        label_offset: (-10.0, -5.0),
        color: egui::Color32::from_rgb(65, 105, 225),
    },
    GroundStation {
        name: "HBK",
        lat: -25.8870,
        lon: 27.7120,
        label_offset: (1.0, -5.0),
        color: egui::Color32::from_rgb(152, 251, 152),
    },
    GroundStation {
        name: "MSP",
        lat: 27.7633,
        lon: -15.6342,
        label_offset: (-5.0, 5.0),
        color: egui::Color32::from_rgb(255, 165, 0),
    },
    GroundStation {
        name: "AUWA",
        lat: -29.0457,
        lon: 115.3487,
        label_offset: (-15.0, -5.0),
        color: egui::Color32::from_rgb(255, 215, 0),
    },
];

pub struct AppContext {
    pub satellite: Satellite,
    pub stations: &'static [GroundStation],
    pub events: Option<Vec<Event>>,
    pub zone: Option<Vec<(f64, f64)>>,
    pub icon: Option<egui::ColorImage>,
    pub coastlines: Vec<Vec<(f64, f64)>>,
}

impl AppContext {
    /// Resolve every startup input. An explicitly requested event file
    /// that cannot be read is an error; the zone and icon files merely
    /// disable their overlays when absent.
    pub fn from_startup(event_file: Option<&Path>) -> Result<Self, String> {
        let satellite = tle::satellite_from_tle(SATELLITE_NAME, TLE_LINE1, TLE_LINE2)?;

        let events = match event_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("event file {}: {}", path.display(), e))?;
                let events = events::parse_events(&text);
                log::info!(
                    "event overlay enabled, {} entries from {}",
                    events.len(),
                    path.display()
                );
                Some(events)
            }
            None => {
                log::info!("event overlay disabled (no event file given)");
                None
            }
        };

        let zone_path = Path::new(ZONE_FILE);
        let zone = if zone_path.is_file() {
            let zone = geo::load_zone(zone_path)?;
            log::info!("restricted-zone overlay enabled, {} vertices", zone.len());
            Some(zone)
        } else {
            log::info!("restricted-zone overlay disabled ({} not found)", ZONE_FILE);
            None
        };

        let icon_path = Path::new(ICON_FILE);
        let icon = if icon_path.is_file() {
            let icon = texture::load_icon(icon_path)?;
            log::info!("spacecraft icon loaded from {}", ICON_FILE);
            Some(icon)
        } else {
            log::info!("spacecraft icon not found, falling back to a marker");
            None
        };

        let coastlines = match geo::load_coastlines() {
            Ok(lines) => lines,
            Err(e) => {
                log::warn!("coastlines unavailable, drawing a bare map: {}", e);
                Vec::new()
            }
        };

        Ok(Self {
            satellite,
            stations: &GROUND_STATIONS,
            events,
            zone,
            icon,
            coastlines,
        })
    }
}
