mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod render;

pub use app::{run_app, LaunchOptions};
pub use config::DEFAULT_CONFIG_FILE;
