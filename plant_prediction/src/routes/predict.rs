use crate::{
    inference_service::{Prediction, PredictionError},
    model_service::ModelService,
    server::SharedState,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

const ROUTE: &str = "/predict";
const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("invalid multipart request: {0}")]
    Rejection(#[from] MultipartRejection),
    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("no `file` field in upload")]
    MissingFile,
    #[error("{0}")]
    Prediction(#[from] PredictionError),
    #[error("prediction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict<M: ModelService>(
    State(state): State<SharedState<M>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, PredictError> {
    state.metrics.record_request(ROUTE);
    let start = Instant::now();

    let result = async {
        let image_data = read_file_field(multipart?).await?;
        tracing::debug!("Received upload of {} bytes", image_data.len());
        let inference_service = state.inference_service.clone();
        let prediction =
            tokio::task::spawn_blocking(move || inference_service.predict(&image_data)).await??;
        Ok::<_, PredictError>(prediction)
    }
    .await;

    state
        .metrics
        .record_prediction_duration(start.elapsed().as_millis() as u64, ROUTE);

    match result {
        Ok(prediction) => Ok(Json(prediction)),
        Err(err) => {
            tracing::error!("Prediction failed: {}", err);
            state.metrics.record_prediction_error(ROUTE);
            Err(err)
        }
    }
}

async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, PredictError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(PredictError::MissingFile)
}
