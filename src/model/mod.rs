//! Model architecture

pub mod cnn;

pub use cnn::{StoolClassifier, StoolClassifierConfig};
