//! YAML-backed `StoryRepository`.
//!
//! A story document is a mapping with a single `scenes` list; each entry
//! uses the field names of [`SceneRecord`].

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use storyweave_core::error::DomainError;
use storyweave_core::ports::{SceneRecord, StoryRepository};

#[derive(Debug, Deserialize)]
struct StoryDocument {
    scenes: Vec<SceneRecord>,
}

/// A story repository serving records parsed once from YAML.
#[derive(Debug, Clone)]
pub struct YamlStoryRepository {
    records: Vec<SceneRecord>,
}

impl YamlStoryRepository {
    /// Parses a story document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Structural` if the document is not a valid story.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let document: StoryDocument = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Structural(format!("invalid story document: {e}")))?;
        Ok(Self {
            records: document.scenes,
        })
    }

    /// Reads and parses a story document from disk.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the file cannot be read, or
    /// `DomainError::Structural` if it is not a valid story.
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Infrastructure(format!("failed to read {}: {e}", path.display()))
        })?;
        let repository = Self::from_yaml(&source)?;
        info!(path = %path.display(), scenes = repository.records.len(), "story loaded from YAML");
        Ok(repository)
    }

    /// The parsed records.
    #[must_use]
    pub fn records(&self) -> &[SceneRecord] {
        &self.records
    }
}

#[async_trait]
impl StoryRepository for YamlStoryRepository {
    async fn fetch(&self) -> Result<Vec<SceneRecord>, DomainError> {
        Ok(self.records.clone())
    }
}
