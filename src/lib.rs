//! # Stool Classifier
//!
//! A Rust library and HTTP service for stool image classification using the
//! Burn framework. A CNN classifier is loaded once at startup and served over
//! a single `POST /predict` endpoint that accepts an uploaded image and
//! returns the predicted stool type with a confidence score.
//!
//! ## Modules
//!
//! - `model`: CNN architecture built with Burn
//! - `inference`: Image preprocessing and the load-once predictor
//! - `labels`: Ordered class-label vocabulary
//! - `server`: Axum application state and routes
//! - `backend`: Compile-time compute backend selection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stool_classifier::{ClassLabels, Predictor};
//!
//! let labels = ClassLabels::from_data_dir("data")?;
//! let predictor = Predictor::load("model/stool-model.mpk", labels)?;
//! let prediction = predictor.predict_bytes(&image_bytes)?;
//! println!("{} ({:.1}%)", prediction.label, prediction.confidence * 100.0);
//! ```

pub mod backend;
pub mod error;
pub mod inference;
pub mod labels;
pub mod model;
pub mod server;

// Re-export commonly used items for convenience
pub use error::{Error, Result};
pub use inference::predictor::{Prediction, Predictor};
pub use labels::ClassLabels;
pub use model::cnn::{StoolClassifier, StoolClassifierConfig};
pub use server::state::{AppState, ServerConfig, SharedState};

/// Number of stool type classes (Bristol scale: type-1 through type-7)
pub const NUM_CLASSES: usize = 7;

/// Square image size expected by the model
pub const IMAGE_SIZE: usize = 224;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
