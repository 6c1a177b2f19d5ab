use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelsError {
    #[error("failed to read class names: {0}")]
    Io(#[from] std::io::Error),
    #[error("class names must be a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("class names list is empty")]
    Empty,
}

/// Ordered class names where position is the model output index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Result<Self, LabelsError> {
        if names.is_empty() {
            return Err(LabelsError::Empty);
        }
        Ok(Self { names })
    }

    pub fn from_json(json: &str) -> Result<Self, LabelsError> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Self::new(names)
    }

    pub fn load(path: &Path) -> Result<Self, LabelsError> {
        let contents = fs::read_to_string(path)?;
        let class_names = Self::from_json(&contents)?;
        tracing::info!("Loaded {} class names from {:?}", class_names.len(), path);
        Ok(class_names)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
