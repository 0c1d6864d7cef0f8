mod label_encoder;
mod model_service;
mod ort_service;
mod prediction;
mod routes;
mod scaler;
mod server;
mod state;
mod telemetry;

pub mod app;
pub mod config;
pub mod metadata;
pub mod model_download;

pub use app::start_app;
