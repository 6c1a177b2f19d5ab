use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("failed to build prometheus exporter: {0}")]
    Exporter(String),
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("metrics are not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub struct Metrics {
    request_counter: Counter<u64>,
    prediction_errors: Counter<u64>,
    prediction_duration: Histogram<u64>,
    registry: Registry,
}

impl Metrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();
        // TODO: opentelemetry-prometheus is deprecated, move to an OTLP exporter
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
            .map_err(|e| MetricsError::Exporter(e.to_string()))?;

        let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
            .with_reader(exporter)
            .build();

        let meter = provider.meter("plant_prediction");
        global::set_meter_provider(provider);

        let request_counter = meter
            .u64_counter("requests_total")
            .with_description("Total number of requests")
            .build();

        let prediction_errors = meter
            .u64_counter("prediction_errors_total")
            .with_description("Total number of failed predictions")
            .build();

        let boundaries = generate_boundaries((10, 50, 100, 500, 2000));

        let prediction_duration = meter
            .u64_histogram("prediction_duration_ms")
            .with_boundaries(boundaries)
            .with_description("Duration of prediction operations in milliseconds")
            .build();

        Ok(Metrics {
            request_counter,
            prediction_errors,
            prediction_duration,
            registry,
        })
    }

    pub fn record_request(&self, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.request_counter.add(1, &attributes);
    }

    pub fn record_prediction_error(&self, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.prediction_errors.add(1, &attributes);
    }

    pub fn record_prediction_duration(&self, duration_ms: u64, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.prediction_duration.record(duration_ms, &attributes);
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> Result<String, MetricsError> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

fn generate_boundaries(parts: (i32, i32, i32, i32, i32)) -> Vec<f64> {
    let first_step: usize = 10;
    let middle_step: usize = 25;
    let end_step: usize = 100;
    let tail_step: usize = 500;
    let first_part = (parts.0..=parts.1).step_by(first_step);
    let middle_part = (parts.1..=parts.2).step_by(middle_step);
    let end_part = (parts.2..=parts.3).step_by(end_step);
    let tail_part = (parts.3..=parts.4).step_by(tail_step);

    let mut seen = HashSet::new();
    first_part
        .chain(middle_part)
        .chain(end_part)
        .chain(tail_part)
        .filter(|&x| seen.insert(x))
        .map(|x| x as f64)
        .collect()
}
