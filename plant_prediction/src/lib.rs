mod inference_service;
mod labels;
mod model_service;
mod ort_service;
mod routes;
mod server;
mod telemetry;

pub mod config;
pub mod preprocessing;

pub use inference_service::{InferenceService, Prediction, PredictionError};
pub use labels::{ClassNames, LabelsError};
pub use model_service::{ModelError, ModelService};
pub use server::{build_router, start_server, HttpServer, SharedState};
pub use telemetry::Metrics;
