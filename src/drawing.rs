//! Map rendering.
//!
//! Draws one frame of the world map into an egui_plot Plot: base map
//! with coastlines, day/night shading, ground-station markers, the
//! ground track with its spacecraft marker or icon, the visibility
//! fill, event annotations, and the restricted-zone outline.

use chrono::Utc;
use eframe::egui;
use egui_plot::{
    Line, MarkerShape, Plot, PlotBounds, PlotImage, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::config::AppContext;
use crate::time::subsolar_point;
use crate::track::{MapScene, GRID_DIM};

const OCEAN: egui::Color32 = egui::Color32::from_rgb(18, 38, 66);
const COASTLINE: egui::Color32 = egui::Color32::from_rgb(145, 158, 170);
const TRACK: egui::Color32 = egui::Color32::from_rgb(90, 150, 255);
const EVENT: egui::Color32 = egui::Color32::from_rgb(130, 180, 255);
const WARNING: egui::Color32 = egui::Color32::from_rgb(255, 80, 80);
const ZONE: egui::Color32 = egui::Color32::from_rgb(215, 215, 215);

const ICON_WIDTH_DEG: f32 = 20.0;
const EVENT_LABEL_OFFSET: (f64, f64) = (1.0, 2.0);
const STALE_EVENTS_WARNING: &str = "You need a new event list file";

/// Split a polyline wherever it jumps across the antimeridian, so the
/// renderer never draws a horizontal streak through the map.
pub(crate) fn split_at_dateline(points: impl Iterator<Item = [f64; 2]>) -> Vec<Vec<[f64; 2]>> {
    let mut segments: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for p in points {
        if let Some(prev) = current.last() {
            if (p[0] - prev[0]).abs() > 180.0 {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(p);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Vertices of the translucent night-side polygon: the terminator curve
/// sampled across all longitudes, closed along the dark pole.
pub(crate) fn night_polygon(subsolar_lat: f64, subsolar_lon: f64) -> Vec<[f64; 2]> {
    // Keep the declination off zero so the terminator stays finite at
    // the equinoxes.
    let declination = if subsolar_lat.abs() < 0.1 {
        0.1_f64.copysign(subsolar_lat)
    } else {
        subsolar_lat
    };
    let tan_decl = declination.to_radians().tan();

    let mut points = Vec::with_capacity(123);
    for i in 0..=120 {
        let lon = -180.0 + 3.0 * i as f64;
        let hour_angle = (lon - subsolar_lon).to_radians();
        let lat = (-hour_angle.cos() / tan_decl).atan().to_degrees();
        points.push([lon, lat]);
    }
    let dark_pole = if declination >= 0.0 { -90.0 } else { 90.0 };
    points.push([180.0, dark_pole]);
    points.push([-180.0, dark_pole]);
    points
}

pub fn draw_map(
    ui: &mut egui::Ui,
    ctx: &AppContext,
    scene: Option<&MapScene>,
    icon_texture: Option<&egui::TextureHandle>,
    width: f32,
    height: f32,
) {
    let plot = Plot::new("ground_track_map")
        .width(width)
        .height(height)
        .show_axes([false, false])
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    plot.show(ui, |plot_ui| {
        plot_ui.set_plot_bounds(PlotBounds::from_min_max([-180.0, -90.0], [180.0, 90.0]));

        plot_ui.polygon(
            Polygon::new(
                "",
                PlotPoints::new(vec![
                    [-180.0, -90.0],
                    [180.0, -90.0],
                    [180.0, 90.0],
                    [-180.0, 90.0],
                ]),
            )
            .fill_color(OCEAN)
            .stroke(egui::Stroke::new(1.0, COASTLINE)),
        );

        for polyline in &ctx.coastlines {
            for segment in split_at_dateline(polyline.iter().map(|&(lat, lon)| [lon, lat])) {
                plot_ui.line(Line::new("", PlotPoints::new(segment)).color(COASTLINE).width(0.8));
            }
        }

        // Shading follows the real wall clock even when the track is
        // offset into the past or future.
        let (subsolar_lat, subsolar_lon) = subsolar_point(Utc::now());
        plot_ui.polygon(
            Polygon::new("", PlotPoints::new(night_polygon(subsolar_lat, subsolar_lon)))
                .fill_color(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 70))
                .stroke(egui::Stroke::NONE),
        );

        for station in ctx.stations {
            plot_ui.points(
                Points::new("", PlotPoints::new(vec![[station.lon, station.lat]]))
                    .shape(MarkerShape::Plus)
                    .radius(7.0)
                    .color(station.color),
            );
            plot_ui.text(
                Text::new(
                    "",
                    PlotPoint::new(
                        station.lon + station.label_offset.0,
                        station.lat + station.label_offset.1,
                    ),
                    egui::RichText::new(station.name).size(13.0),
                )
                .color(station.color)
                .anchor(egui::Align2::LEFT_BOTTOM),
            );
        }

        if let Some(scene) = scene {
            draw_scene(plot_ui, ctx, scene, icon_texture);
        }

        if let Some(zone) = &ctx.zone {
            let pts: PlotPoints = zone.iter().map(|&(lon, lat)| [lon, lat]).collect();
            plot_ui.line(Line::new("", pts).color(ZONE).width(1.2));
            plot_ui.text(
                Text::new("", PlotPoint::new(-25.0, -39.0), egui::RichText::new("SAA").size(13.0))
                    .color(ZONE)
                    .anchor(egui::Align2::LEFT_BOTTOM),
            );
        }
    });
}

fn draw_scene(
    plot_ui: &mut egui_plot::PlotUi,
    ctx: &AppContext,
    scene: &MapScene,
    icon_texture: Option<&egui::TextureHandle>,
) {
    for segment in split_at_dateline(scene.track.iter().map(|s| [s.lon_deg, s.lat_deg])) {
        plot_ui.line(Line::new("", PlotPoints::new(segment)).color(TRACK).width(1.5));
    }

    let visibility_fill = egui::Color32::from_rgba_unmultiplied(80, 140, 255, 45);
    for i in 0..GRID_DIM - 1 {
        for j in 0..GRID_DIM - 1 {
            if scene.visibility.elevation_deg(i, j) <= 0.0 {
                continue;
            }
            let quad = vec![
                [scene.visibility.node_lon(i), scene.visibility.node_lat(j)],
                [scene.visibility.node_lon(i + 1), scene.visibility.node_lat(j)],
                [scene.visibility.node_lon(i + 1), scene.visibility.node_lat(j + 1)],
                [scene.visibility.node_lon(i), scene.visibility.node_lat(j + 1)],
            ];
            plot_ui.polygon(
                Polygon::new("", PlotPoints::new(quad))
                    .fill_color(visibility_fill)
                    .stroke(egui::Stroke::NONE),
            );
        }
    }

    if let Some(first) = scene.track.first() {
        let center = PlotPoint::new(first.lon_deg, first.lat_deg);
        if let Some(texture) = icon_texture {
            let size = egui::vec2(ICON_WIDTH_DEG, ICON_WIDTH_DEG / texture.aspect_ratio());
            plot_ui.image(PlotImage::new("", texture.id(), center, size));
        } else {
            plot_ui.points(
                Points::new("", PlotPoints::new(vec![[first.lon_deg, first.lat_deg]]))
                    .shape(MarkerShape::Plus)
                    .radius(7.0)
                    .color(TRACK),
            );
            plot_ui.text(
                Text::new(
                    "",
                    PlotPoint::new(first.lon_deg + 1.0, first.lat_deg - 5.0),
                    egui::RichText::new(ctx.satellite.name.as_str()).size(13.0),
                )
                .color(TRACK)
                .anchor(egui::Align2::LEFT_BOTTOM),
            );
        }
    }

    for marker in &scene.event_markers {
        plot_ui.points(
            Points::new("", PlotPoints::new(vec![[marker.lon_deg, marker.lat_deg]]))
                .radius(4.0)
                .filled(true)
                .color(EVENT),
        );
        // Labels hang off the side away from the map edge; a marker
        // sitting exactly on the prime meridian stays unlabeled.
        let anchor = if marker.lon_deg < 0.0 {
            Some(egui::Align2::LEFT_BOTTOM)
        } else if marker.lon_deg > 0.0 {
            Some(egui::Align2::RIGHT_BOTTOM)
        } else {
            None
        };
        if let Some(anchor) = anchor {
            plot_ui.text(
                Text::new(
                    "",
                    PlotPoint::new(
                        marker.lon_deg + EVENT_LABEL_OFFSET.0,
                        marker.lat_deg + EVENT_LABEL_OFFSET.1,
                    ),
                    egui::RichText::new(marker.label.as_str()).size(13.0),
                )
                .color(EVENT)
                .anchor(anchor),
            );
        }
    }

    if scene.stale_events {
        plot_ui.text(
            Text::new(
                "",
                PlotPoint::new(0.0, 0.0),
                egui::RichText::new(STALE_EVENTS_WARNING).size(20.0),
            )
            .color(WARNING)
            .anchor(egui::Align2::CENTER_CENTER),
        );
    }
}
