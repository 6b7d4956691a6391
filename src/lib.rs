pub mod app;
pub mod cli;
pub mod client;
pub mod configuration;
pub mod tui;
