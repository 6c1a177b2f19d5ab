use axum::{response::IntoResponse, response::Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct Health {
    status: String,
    version: String,
}

pub async fn healthcheck() -> impl IntoResponse {
    Json(Health {
        status: "Available".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
