//! Class label vocabulary
//!
//! The mapping from model output index to label name. Labels are loaded
//! either from an explicit ordered JSON file persisted alongside the
//! weights (preferred), or by listing and lexicographically sorting the
//! subdirectory names of the training data directory. The sort order is a
//! contract with training time: it must match the order used when the
//! weights were produced.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Ordered sequence of class names, one per model output index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassLabels {
    names: Vec<String>,
}

impl ClassLabels {
    /// Create a label set from an ordered list of names
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::Labels("label set is empty".to_string()));
        }
        Ok(Self { names })
    }

    /// Load labels from an explicit ordered JSON list (`["type-1", ...]`)
    ///
    /// This is the preferred source: directory-listing order is not
    /// guaranteed to be stable across filesystems, an explicit file is.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }

        let json = std::fs::read_to_string(path)?;
        let names: Vec<String> = serde_json::from_str(&json)?;

        info!("Loaded {} class labels from {:?}", names.len(), path);
        Self::new(names)
    }

    /// Derive labels from the immediate subdirectory names of a data
    /// directory, sorted lexicographically (the order used at training time)
    pub fn from_data_dir<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        if !data_dir.exists() {
            return Err(Error::PathNotFound(data_dir.to_path_buf()));
        }

        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        info!("Found {} classes in {:?}", names.len(), data_dir);
        Self::new(names)
    }

    /// Check that the vocabulary size matches the model's output width.
    /// A mismatch would make label mapping silently wrong, so it is a
    /// startup failure rather than a request-time fault.
    pub fn validate(&self, expected: usize) -> Result<()> {
        if self.names.len() != expected {
            return Err(Error::Labels(format!(
                "label count {} does not match model output width {}",
                self.names.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Get the label name for a class index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the label set is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check whether a name is a member of the vocabulary
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterate over labels in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn stool_types() -> Vec<String> {
        (1..=7).map(|i| format!("type-{}", i)).collect()
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(ClassLabels::new(Vec::new()).is_err());
    }

    #[test]
    fn test_indexing() {
        let labels = ClassLabels::new(stool_types()).unwrap();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels.get(2), Some("type-3"));
        assert_eq!(labels.get(7), None);
        assert!(labels.contains("type-7"));
        assert!(!labels.contains("type-8"));
    }

    #[test]
    fn test_validate() {
        let labels = ClassLabels::new(stool_types()).unwrap();
        assert!(labels.validate(7).is_ok());

        let err = labels.validate(5).unwrap_err();
        assert!(matches!(err, Error::Labels(_)));
    }

    #[test]
    fn test_from_data_dir_sorted() {
        let dir = std::env::temp_dir().join("stool_labels_test_sorted");
        let _ = fs::remove_dir_all(&dir);
        // Created out of order; listing must come back sorted.
        for name in ["type-3", "type-1", "type-2"] {
            fs::create_dir_all(dir.join(name)).unwrap();
        }
        // Plain files are not classes.
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let labels = ClassLabels::from_data_dir(&dir).unwrap();
        assert_eq!(
            labels.iter().collect::<Vec<_>>(),
            vec!["type-1", "type-2", "type-3"]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_from_data_dir_missing() {
        let err = ClassLabels::from_data_dir("/nonexistent/stool/data").unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
    }

    #[test]
    fn test_from_file_round_trip() {
        let path = std::env::temp_dir().join("stool_labels_test.json");
        fs::write(&path, serde_json::to_string(&stool_types()).unwrap()).unwrap();

        let labels = ClassLabels::from_file(&path).unwrap();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels.get(0), Some("type-1"));

        fs::remove_file(&path).unwrap();
    }
}
