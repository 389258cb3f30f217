//! Inference: preprocessing and the load-once predictor

pub mod predictor;
pub mod preprocess;

pub use predictor::{Prediction, Predictor};
