//! Desktop dashboard for the professional outcomes of French Master's graduates.

pub mod app;
pub mod choropleth;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod regression;
pub mod resources;
pub mod state;
pub mod ui;
