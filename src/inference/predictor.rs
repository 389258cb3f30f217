//! Inference Predictor
//!
//! Holds the ready-to-serve classifier: weights loaded once, labels
//! validated against the model's output width, read-only afterwards.
//! Runs on a non-autodiff backend, so the forward pass keeps no gradient
//! bookkeeping and dropout is inactive.

use std::path::Path;

use burn::{module::Module, record::CompactRecorder};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::{default_device, InferenceBackend, InferenceDevice};
use crate::error::{Error, Result};
use crate::inference::preprocess;
use crate::labels::ClassLabels;
use crate::model::cnn::{StoolClassifier, StoolClassifierConfig};

/// Result of a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class index (arg-max of the output distribution)
    pub class_index: usize,

    /// Predicted class label
    pub label: String,

    /// Probability assigned to the predicted class, in [0, 1]
    pub confidence: f32,

    /// Full probability distribution over all classes
    pub probabilities: Vec<f32>,
}

/// Predictor for running inference with a trained model
#[derive(Debug)]
pub struct Predictor {
    model: StoolClassifier<InferenceBackend>,
    labels: ClassLabels,
    device: InferenceDevice,
    image_size: usize,
}

impl Predictor {
    /// Load a predictor from a weights file with the default architecture
    pub fn load<P: AsRef<Path>>(weights_path: P, labels: ClassLabels) -> Result<Self> {
        Self::load_with_config(&StoolClassifierConfig::new(), weights_path, labels)
    }

    /// Load a predictor with an explicit model configuration
    ///
    /// Instantiates the architecture fresh, then assigns the persisted
    /// tensors by name and shape. A missing or corrupt file, or any
    /// name/shape mismatch, fails here - before the service accepts
    /// traffic.
    pub fn load_with_config<P: AsRef<Path>>(
        config: &StoolClassifierConfig,
        weights_path: P,
        labels: ClassLabels,
    ) -> Result<Self> {
        let weights_path = weights_path.as_ref();
        // The recorder appends its own extension when the path has none.
        if !weights_path.exists() && !weights_path.with_extension("mpk").exists() {
            return Err(Error::ModelLoad(format!(
                "weights file not found: {:?}",
                weights_path
            )));
        }

        let device = default_device();
        let recorder = CompactRecorder::new();

        let model = StoolClassifier::<InferenceBackend>::new(config, &device)
            .load_file(weights_path, &recorder, &device)
            .map_err(|e| Error::ModelLoad(format!("{:?}", e)))?;

        // The recorder assigns tensors by name without shape checks;
        // verify the loaded head really has the expected output width.
        let head_width = model.head_width();
        if head_width != config.num_classes {
            return Err(Error::ModelLoad(format!(
                "weights file has a {}-class head, expected {}",
                head_width, config.num_classes
            )));
        }

        info!(
            "Loaded model from {:?} ({} classes, input {}x{})",
            weights_path, config.num_classes, config.input_size, config.input_size
        );

        let mut predictor = Self::from_parts(model, labels)?;
        predictor.image_size = config.input_size;
        Ok(predictor)
    }

    /// Build a predictor from an already constructed model and label set.
    ///
    /// Validates that the vocabulary length matches the model's output
    /// width so label mapping can never be silently wrong at request time.
    pub fn from_parts(model: StoolClassifier<InferenceBackend>, labels: ClassLabels) -> Result<Self> {
        labels.validate(model.num_classes())?;

        Ok(Self {
            model,
            labels,
            device: default_device(),
            image_size: crate::IMAGE_SIZE,
        })
    }

    /// Configure the square input size (the model is input-size agnostic
    /// thanks to global pooling, but the trained weights expect the size
    /// used at training time)
    pub fn with_image_size(mut self, size: usize) -> Self {
        self.image_size = size;
        self
    }

    /// Run inference on raw image bytes (any format decodable to RGB)
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<Prediction> {
        let image = image::load_from_memory(bytes)?;
        self.predict_image(&image)
    }

    /// Run inference on a decoded image
    pub fn predict_image(&self, image: &DynamicImage) -> Result<Prediction> {
        let input = preprocess::to_model_input::<InferenceBackend>(image, self.image_size, &self.device);

        let output = self.model.forward_softmax(input);
        let probabilities: Vec<f32> = output
            .into_data()
            .to_vec()
            .map_err(|e| Error::Inference(format!("failed to extract probabilities: {:?}", e)))?;

        let (class_index, confidence) = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(idx, &p)| (idx, p))
            .ok_or_else(|| Error::Inference("model produced an empty output".to_string()))?;

        // In range by construction: labels were validated against the
        // output width at startup.
        let label = self
            .labels
            .get(class_index)
            .ok_or_else(|| {
                Error::Inference(format!("class index {} has no label", class_index))
            })?
            .to_string();

        Ok(Prediction {
            class_index,
            label,
            confidence,
            probabilities,
        })
    }

    /// The label vocabulary served by this predictor
    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }

    /// Square input size in pixels
    pub fn image_size(&self) -> usize {
        self.image_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::default_device;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn stool_labels() -> ClassLabels {
        ClassLabels::new((1..=7).map(|i| format!("type-{}", i)).collect()).unwrap()
    }

    fn fresh_predictor() -> Predictor {
        let device = default_device();
        let model = StoolClassifier::new(&StoolClassifierConfig::new(), &device);
        // Small input keeps CPU test forwards cheap; the architecture is
        // input-size agnostic.
        Predictor::from_parts(model, stool_labels())
            .unwrap()
            .with_image_size(64)
    }

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let mut buf = RgbImage::new(width, height);
        for (x, y, pixel) in buf.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }
        DynamicImage::ImageRgb8(buf)
    }

    #[test]
    fn test_from_parts_rejects_label_mismatch() {
        let device = default_device();
        let model = StoolClassifier::new(&StoolClassifierConfig::new(), &device);
        let labels = ClassLabels::new(vec!["a".to_string(), "b".to_string()]).unwrap();

        let err = Predictor::from_parts(model, labels).unwrap_err();
        assert!(matches!(err, Error::Labels(_)));
    }

    #[test]
    fn test_prediction_is_valid_distribution() {
        let predictor = fresh_predictor();
        let prediction = predictor.predict_image(&gradient_image(500, 300)).unwrap();

        assert!((0.0..=1.0).contains(&prediction.confidence));
        assert_eq!(prediction.probabilities.len(), 7);
        let sum: f32 = prediction.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);

        // The label is a member of the vocabulary and matches the arg-max.
        assert!(predictor.labels().contains(&prediction.label));
        assert_eq!(
            predictor.labels().get(prediction.class_index),
            Some(prediction.label.as_str())
        );
        assert_eq!(prediction.confidence, prediction.probabilities[prediction.class_index]);
    }

    #[test]
    fn test_identical_bytes_identical_prediction() {
        let predictor = fresh_predictor();

        let mut bytes = Vec::new();
        gradient_image(64, 48)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let first = predictor.predict_bytes(&bytes).unwrap();
        let second = predictor.predict_bytes(&bytes).unwrap();

        assert_eq!(first.class_index, second.class_index);
        assert_eq!(first.label, second.label);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.probabilities, second.probabilities);
    }

    #[test]
    fn test_predict_bytes_rejects_garbage() {
        let predictor = fresh_predictor();
        let err = predictor.predict_bytes(b"not an image at all").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_load_missing_weights_fails() {
        let err = Predictor::load("/nonexistent/stool-model.mpk", stool_labels()).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    #[test]
    fn test_save_load_round_trip_preserves_outputs() {
        let device = default_device();
        let model = StoolClassifier::new(&StoolClassifierConfig::new(), &device);

        let path = std::env::temp_dir().join("stool_predictor_roundtrip");
        model
            .clone()
            .save_file(&path, &CompactRecorder::new())
            .unwrap();

        let original = Predictor::from_parts(model, stool_labels())
            .unwrap()
            .with_image_size(64);
        let reloaded = Predictor::load(&path, stool_labels())
            .unwrap()
            .with_image_size(64);

        let image = gradient_image(100, 100);
        let a = original.predict_image(&image).unwrap();
        let b = reloaded.predict_image(&image).unwrap();

        assert_eq!(a.class_index, b.class_index);
        // The compact record stores half precision, so compare with a
        // tolerance rather than exactly.
        for (pa, pb) in a.probabilities.iter().zip(&b.probabilities) {
            assert!((pa - pb).abs() < 2e-3, "probabilities diverged: {} vs {}", pa, pb);
        }

        let _ = std::fs::remove_file(path.with_extension("mpk"));
    }

    #[test]
    fn test_load_rejects_architecture_mismatch() {
        let device = default_device();
        // Saved with 5 output classes, loaded into the default 7-class head.
        let small = StoolClassifier::<InferenceBackend>::new(
            &StoolClassifierConfig::new().with_num_classes(5),
            &device,
        );

        let path = std::env::temp_dir().join("stool_predictor_mismatch");
        small.save_file(&path, &CompactRecorder::new()).unwrap();

        let err = Predictor::load(&path, stool_labels()).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));

        let _ = std::fs::remove_file(path.with_extension("mpk"));
    }
}
