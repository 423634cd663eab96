//! Application shell and eframe integration.
//!
//! Owns the App struct, the Auto/Manual update state machine, the
//! 10-second refresh timer, and the control strip below the map.

mod config;
mod drawing;
mod events;
mod geo;
mod texture;
mod time;
mod tle;
mod track;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use eframe::egui;

use crate::config::{AppContext, SLIDER_MAX, SLIDER_MIN, UPDATE_INTERVAL_SECS};
use crate::track::MapScene;

/// Ground-track map for a single satellite.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Event list file; enables the event overlay.
    event_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum UpdateMode {
    Auto,
    Manual,
}

/// Repeating timer realized as an elapsed-time check inside the egui
/// update loop; firing and redrawing therefore never overlap.
struct UpdateTimer {
    interval: Duration,
    last_fire: Instant,
    running: bool,
}

impl UpdateTimer {
    fn new(interval: Duration) -> Self {
        Self { interval, last_fire: Instant::now(), running: true }
    }

    fn start(&mut self) {
        self.running = true;
        self.last_fire = Instant::now();
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn due(&mut self) -> bool {
        if self.running && self.last_fire.elapsed() >= self.interval {
            self.last_fire = Instant::now();
            true
        } else {
            false
        }
    }
}

struct App {
    ctx: AppContext,
    scene: Option<MapScene>,
    mode: UpdateMode,
    offset_minutes: i64,
    timer: UpdateTimer,
    icon_texture: Option<egui::TextureHandle>,
}

impl App {
    fn with_context(ctx: AppContext) -> Self {
        let mut app = Self {
            ctx,
            scene: None,
            mode: UpdateMode::Auto,
            offset_minutes: 0,
            timer: UpdateTimer::new(Duration::from_secs(UPDATE_INTERVAL_SECS)),
            icon_texture: None,
        };
        app.run_update(0);
        app
    }

    fn new(cc: &eframe::CreationContext<'_>, ctx: AppContext) -> Self {
        let icon_texture = ctx.icon.clone().map(|image| {
            cc.egui_ctx.load_texture("spacecraft_icon", image, egui::TextureOptions::LINEAR)
        });
        let mut app = Self::with_context(ctx);
        app.icon_texture = icon_texture;
        app
    }

    /// One controller invocation. On failure the previous scene stays up.
    fn run_update(&mut self, offset_minutes: i64) {
        match track::build_scene(&self.ctx, offset_minutes) {
            Ok(scene) => self.scene = Some(scene),
            Err(e) => log::error!("map update failed: {}", e),
        }
    }

    fn toggle_auto_update(&mut self) {
        match self.mode {
            UpdateMode::Auto => {
                self.mode = UpdateMode::Manual;
                self.timer.stop();
                self.run_update(self.offset_minutes);
            }
            UpdateMode::Manual => {
                // Resuming only restarts the cadence; the map keeps the
                // last manual view until the next tick fires at offset 0.
                self.mode = UpdateMode::Auto;
                self.timer.start();
            }
        }
    }

    fn offset_changed(&mut self) {
        if self.mode == UpdateMode::Auto {
            self.mode = UpdateMode::Manual;
            self.timer.stop();
        }
        self.run_update(self.offset_minutes);
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.timer.due() {
            self.run_update(0);
        }

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let toggle_label = match self.mode {
                    UpdateMode::Auto => "Stop update",
                    UpdateMode::Manual => "Auto update",
                };
                if ui.button(toggle_label).clicked() {
                    self.toggle_auto_update();
                }

                let slider = egui::Slider::new(&mut self.offset_minutes, SLIDER_MIN..=SLIDER_MAX)
                    .suffix(" min");
                if ui.add(slider).changed() {
                    self.offset_changed();
                }

                if ui.button("Close").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(scene) = &self.scene {
                ui.heading(format!(
                    "{} orbit {} (UT)",
                    self.ctx.satellite.name,
                    scene.origin.format("%Y/%m/%d %H:%M")
                ));
            }
            let available = ui.available_size();
            drawing::draw_map(
                ui,
                &self.ctx,
                self.scene.as_ref(),
                self.icon_texture.as_ref(),
                available.x,
                available.y,
            );
        });

        // Keep the loop alive so the timer fires without user input.
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let app_ctx = match AppContext::from_startup(args.event_file.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let title = format!("{} ground track", app_ctx.satellite.name);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        "orbit-viz",
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, app_ctx)))),
    )
}
