//! Application state for the classification server
//!
//! Holds the configuration and the loaded predictor. Everything here is
//! read-only after startup, so concurrent requests share it without
//! locking.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inference::predictor::Predictor;
use crate::labels::ClassLabels;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the persisted model weights
    pub weights_path: PathBuf,
    /// Training data directory; its sorted subdirectory names define the
    /// label vocabulary when no label file is present
    pub data_dir: PathBuf,
    /// Explicit ordered label file (preferred over the directory scan)
    pub labels_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::from("model/stool-model.mpk"),
            data_dir: PathBuf::from("data"),
            labels_file: None,
        }
    }
}

impl ServerConfig {
    /// Resolve the label vocabulary.
    ///
    /// Order of preference: explicit `labels_file`, then a `labels.json`
    /// next to the weights, then the sorted subdirectories of `data_dir`.
    pub fn load_labels(&self) -> Result<ClassLabels> {
        if let Some(path) = &self.labels_file {
            return ClassLabels::from_file(path);
        }

        if let Some(parent) = self.weights_path.parent() {
            let sibling = parent.join("labels.json");
            if sibling.exists() {
                return ClassLabels::from_file(sibling);
            }
        }

        ClassLabels::from_data_dir(&self.data_dir)
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// The loaded classifier. Weights never change after startup, but
    /// burn's lazy parameter initialization is not `Sync`, so access goes
    /// through a mutex taken on the blocking worker.
    pub predictor: Mutex<Predictor>,
    /// Output width of the loaded model
    pub num_classes: usize,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, predictor: Predictor) -> Self {
        Self {
            config,
            num_classes: predictor.num_classes(),
            predictor: Mutex::new(predictor),
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
