mod health;
mod metrics;
mod predict;
mod root;

use crate::{model_service::ModelService, server::SharedState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes<M: ModelService>() -> Router<SharedState<M>> {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::healthcheck))
        .route("/metrics", get(metrics::metrics_handler::<M>))
        .route("/predict", post(predict::predict::<M>))
}
