use eframe::egui;

use crate::error::ResourceError;
use crate::resources::Resources;
use crate::state::{AppState, Tab};
use crate::ui::{clustering, exploration, geography, home, overview, panels, prediction, press, social};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub enum DashboardApp {
    Ready {
        state: Box<AppState>,
        wordclouds: [egui::TextureHandle; 2],
    },
    /// A startup resource is missing: only the message is rendered.
    Failed(String),
}

impl DashboardApp {
    /// Upload the word clouds and build the state, or keep the failure.
    pub fn new(ctx: &egui::Context, resources: Result<Resources, ResourceError>) -> Self {
        match resources {
            Ok(mut resources) => {
                let [first, second] = std::mem::take(&mut resources.wordclouds);
                let options = egui::TextureOptions::LINEAR;
                let wordclouds = [
                    ctx.load_texture("wordcloud_1", first, options),
                    ctx.load_texture("wordcloud_2", second, options),
                ];
                DashboardApp::Ready {
                    state: Box::new(AppState::new(resources)),
                    wordclouds,
                }
            }
            Err(e) => DashboardApp::Failed(e.user_message()),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (state, wordclouds) = match self {
            DashboardApp::Ready { state, wordclouds } => (state, wordclouds),
            DashboardApp::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    panels::failure_panel(ui, message);
                });
                return;
            }
        };

        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
            ui.separator();
            panels::tab_bar(ui, state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        // ---- Central panel: the selected view ----
        let tab = state.tab;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt(tab.label())
                .auto_shrink([false, false])
                .show(ui, |ui| match tab {
                    Tab::Home => home::show(ui),
                    Tab::Overview => overview::show(ui, state),
                    Tab::Press => press::show(ui, wordclouds),
                    Tab::Geography => geography::show(ui, state),
                    Tab::Social => social::show(ui, state),
                    Tab::Clustering => clustering::show(ui, state),
                    Tab::Prediction => prediction::show(ui, state),
                    Tab::Exploration => exploration::show(ui, state),
                });
        });
    }
}
