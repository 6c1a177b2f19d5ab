use crate::{
    labels::ClassNames,
    model_service::{ModelError, ModelService},
    preprocessing::{preprocess, PreprocessError},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("{0}")]
    Preprocess(#[from] PreprocessError),
    #[error("{0}")]
    Model(#[from] ModelError),
    #[error("model returned an empty output")]
    EmptyOutput,
    #[error("class index {index} out of range for {len} class names")]
    UnknownClass { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: String,
    pub confidence: f32,
}

#[derive(Clone)]
pub struct InferenceService<M: ModelService> {
    model_service: Arc<M>,
    class_names: Arc<ClassNames>,
    image_size: u32,
}

impl<M: ModelService> InferenceService<M> {
    pub fn new(model_service: M, class_names: ClassNames, image_size: u32) -> Self {
        Self {
            model_service: Arc::new(model_service),
            class_names: Arc::new(class_names),
            image_size,
        }
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }

    pub fn predict(&self, image_data: &[u8]) -> Result<Prediction, PredictionError> {
        let (input, _resized) = preprocess(image_data, self.image_size)?;
        let scores = self.model_service.run(&input)?;

        let (index, confidence) = argmax(scores.iter().copied())?;
        let label = self
            .class_names
            .get(index)
            .ok_or(PredictionError::UnknownClass {
                index,
                len: self.class_names.len(),
            })?;

        tracing::debug!(
            "Predicted class {} ({}) with confidence {:.3}",
            index,
            label,
            confidence
        );

        Ok(Prediction {
            prediction: label.to_string(),
            confidence,
        })
    }
}

/// Index and value of the highest score; the first one wins on ties and the
/// first NaN outranks everything.
fn argmax(scores: impl Iterator<Item = f32>) -> Result<(usize, f32), PredictionError> {
    scores
        .enumerate()
        .reduce(|accum, item| {
            if !accum.1.is_nan() && (item.1.is_nan() || item.1 > accum.1) {
                item
            } else {
                accum
            }
        })
        .ok_or(PredictionError::EmptyOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use ndarray::{Array, ArrayD, Ix4, IxDyn};
    use std::io::Cursor;

    #[derive(Clone)]
    struct MockModelService {
        scores: Vec<f32>,
    }

    impl ModelService for MockModelService {
        fn run(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, ModelError> {
            assert_eq!(input.shape(), &[1, 256, 256, 3]);
            Ok(ArrayD::from_shape_vec(
                IxDyn(&[1, self.scores.len()]),
                self.scores.clone(),
            )?)
        }
    }

    #[derive(Clone)]
    struct FailingModelService {}

    impl ModelService for FailingModelService {
        fn run(&self, _input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, ModelError> {
            Err(ModelError::Inference("Got invalid dimensions for input".into()))
        }
    }

    fn class_names() -> ClassNames {
        ClassNames::new(vec![
            "Potato___Early_blight".to_string(),
            "Potato___Late_blight".to_string(),
            "Potato___healthy".to_string(),
        ])
        .unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(100, 100, Rgb([34, 139, 34]));
        let mut image_data: Vec<u8> = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut image_data), image::ImageFormat::Png)
            .unwrap();
        image_data
    }

    #[test]
    fn test_predict_picks_highest_score() {
        let model = MockModelService {
            scores: vec![0.1, 0.7, 0.2],
        };
        let service = InferenceService::new(model, class_names(), 256);

        let prediction = service.predict(&png_bytes()).unwrap();

        assert_eq!(prediction.prediction, "Potato___Late_blight");
        assert_eq!(prediction.confidence, 0.7);
        assert!(service.class_names().contains(&prediction.prediction));
    }

    #[test]
    fn test_predict_unknown_class_index() {
        let model = MockModelService {
            scores: vec![0.05, 0.05, 0.1, 0.8],
        };
        let service = InferenceService::new(model, class_names(), 256);

        let err = service.predict(&png_bytes()).unwrap_err();

        assert!(matches!(
            err,
            PredictionError::UnknownClass { index: 3, len: 3 }
        ));
    }

    #[test]
    fn test_predict_propagates_decode_error() {
        let model = MockModelService {
            scores: vec![1.0, 0.0, 0.0],
        };
        let service = InferenceService::new(model, class_names(), 256);

        let err = service.predict(b"not an image").unwrap_err();

        assert!(matches!(err, PredictionError::Preprocess(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_predict_propagates_model_error() {
        let service = InferenceService::new(FailingModelService {}, class_names(), 256);

        let err = service.predict(&png_bytes()).unwrap_err();

        assert_eq!(err.to_string(), "inference failed: Got invalid dimensions for input");
    }

    #[test]
    fn test_predict_empty_output() {
        let model = MockModelService { scores: vec![] };
        let service = InferenceService::new(model, class_names(), 256);

        assert!(matches!(
            service.predict(&png_bytes()),
            Err(PredictionError::EmptyOutput)
        ));
    }

    #[test]
    fn test_argmax_keeps_first_on_ties() {
        let (index, value) = argmax(vec![0.2, 0.4, 0.4, 0.0].into_iter()).unwrap();

        assert_eq!(index, 1);
        assert_eq!(value, 0.4);
    }

    #[test]
    fn test_argmax_picks_first_nan() {
        let (index, value) = argmax(vec![0.9, f32::NAN, 0.3, f32::NAN].into_iter()).unwrap();

        assert_eq!(index, 1);
        assert!(value.is_nan());

        let (index, _) = argmax(vec![f32::NAN, 0.9].into_iter()).unwrap();
        assert_eq!(index, 0);
    }
}
