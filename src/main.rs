use eframe::egui;
use insertion_dashboard::app::DashboardApp;
use insertion_dashboard::config::DashboardConfig;
use insertion_dashboard::error::ResourceError;
use insertion_dashboard::resources::Resources;

fn main() -> eframe::Result {
    env_logger::init();

    let resources = DashboardConfig::discover()
        .map_err(ResourceError::Config)
        .and_then(|config| Resources::load(&config));
    if let Err(e) = &resources {
        log::error!("Startup failed: {e}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Data Mining : Insertion des Masters")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Data Mining : Insertion des Masters",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DashboardApp::new(&cc.egui_ctx, resources)))
        }),
    )
}
