use ndarray::{Array, ArrayD, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("session mutex poisoned: {0}")]
    Poisoned(String),
    #[error("failed to build tensor: {0}")]
    Tensor(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("failed to extract tensor: {0}")]
    Extract(String),
    #[error("invalid tensor shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// A loaded classifier that maps one NHWC image tensor to a score vector.
pub trait ModelService: Send + Sync + Clone + 'static {
    fn run(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, ModelError>;
}
