pub mod common;
pub mod config;
pub mod logging;
pub mod model;
pub mod pipeline;

// Layered boundaries: ports consumed by the model, adapters behind them
pub mod app;
pub mod infra;
