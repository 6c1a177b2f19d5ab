use crate::{model_service::ModelService, server::SharedState, telemetry::MetricsError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn metrics_handler<M: ModelService>(
    State(state): State<SharedState<M>>,
) -> Result<String, MetricsError> {
    state.metrics.render()
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        tracing::error!("Failed to render metrics: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
