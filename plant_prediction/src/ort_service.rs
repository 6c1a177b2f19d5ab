use crate::{
    config::{ModelConfig, Validatable},
    model_service::{ModelError, ModelService},
};
use ndarray::{Array, ArrayD, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

#[derive(Clone)]
pub struct OrtModelService {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ort::Error> {
        let num_instances = model_config.num_instances.max(1);
        let model_path = model_config.get_path();
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(&model_path)?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        tracing::info!(
            "Created {} ONNX sessions from {:?}",
            num_instances,
            model_path
        );

        Ok(Self {
            counter: Arc::new(AtomicUsize::new(0)),
            sessions: Arc::new(sessions),
        })
    }
}

impl ModelService for OrtModelService {
    fn run(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, ModelError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| ModelError::Poisoned(e.to_string()))?;

        tracing::debug!("Handling request with session {}", index);
        let owned_buffer;
        let input_view = if input.view().is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.as_standard_layout().to_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)
            .map_err(|e| ModelError::Tensor(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Extract(e.to_string()))?;

        let array = ArrayD::from_shape_vec(shape.to_ixdyn(), data.to_vec())?;

        Ok(array)
    }
}
