//! keyboard-sketchbook: virtual piano with a harmony sketchbook

mod app;
mod config;
mod panels;

use app::SketchbookApp;
use eframe::NativeOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("sketchbook=debug".parse().unwrap())
            .add_directive("keyboard_sketchbook=debug".parse().unwrap())
            .add_directive("wgpu=warn".parse().unwrap())
            .add_directive("eframe=warn".parse().unwrap()))
        .init();

    tracing::info!("Starting Keyboard Sketchbook");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Keyboard Sketchbook",
        options,
        Box::new(|cc| Ok(Box::new(SketchbookApp::new(cc)))),
    )
}
