//! egui rendering: side panel, top bar, and one module per tab.

pub mod charts;
pub mod clustering;
pub mod exploration;
pub mod geography;
pub mod home;
pub mod overview;
pub mod panels;
pub mod prediction;
pub mod press;
pub mod social;
