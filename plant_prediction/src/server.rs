use crate::{
    config::{Config, ServerConfig, Validatable},
    inference_service::InferenceService,
    labels::ClassNames,
    model_service::ModelService,
    ort_service::OrtModelService,
    routes::api_routes,
    telemetry::Metrics,
};
use axum::{extract::DefaultBodyLimit, Router};
use axum_otel_metrics::HttpMetricsLayerBuilder;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct SharedState<M: ModelService> {
    pub inference_service: InferenceService<M>,
    pub metrics: Arc<Metrics>,
}

pub fn build_router<M: ModelService>(state: SharedState<M>, config: &ServerConfig) -> Router {
    let metrics_layer = HttpMetricsLayerBuilder::new().build();

    Router::new()
        .merge(api_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(metrics_layer)
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<M: ModelService>(
        state: SharedState<M>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let router = build_router(state, config);
        let listener = TcpListener::bind(config.get_address()).await?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("Starting app on {}", self.listener.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, starting graceful shutdown");
            })
            .await?;

        Ok(())
    }
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let class_names = ClassNames::load(&config.labels.get_path())?;
    let model_service = OrtModelService::new(&config.model)?;
    let metrics = Arc::new(Metrics::new()?);

    let state = SharedState {
        inference_service: InferenceService::new(
            model_service,
            class_names,
            config.model.image_size,
        ),
        metrics,
    };

    let server = HttpServer::new(state, &config.server).await?;
    server.run().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
