pub mod api;
pub mod commands;
pub mod config;
pub mod portfolio;
pub mod refresh;
pub mod render;
pub mod state;
pub mod store;
pub mod types;
