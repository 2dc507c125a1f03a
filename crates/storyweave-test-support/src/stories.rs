//! Fake `StoryRepository` implementations.

use async_trait::async_trait;
use storyweave_core::error::DomainError;
use storyweave_core::ports::{SceneRecord, StoryRepository};

/// A story repository that returns a fixed set of scene records.
#[derive(Debug, Clone)]
pub struct InMemoryStoryRepository {
    records: Vec<SceneRecord>,
}

impl InMemoryStoryRepository {
    /// Creates a repository that returns `records` from every fetch.
    #[must_use]
    pub fn new(records: Vec<SceneRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryRepository {
    async fn fetch(&self) -> Result<Vec<SceneRecord>, DomainError> {
        Ok(self.records.clone())
    }
}

/// A story repository whose fetch always fails.
#[derive(Debug)]
pub struct FailingStoryRepository;

#[async_trait]
impl StoryRepository for FailingStoryRepository {
    async fn fetch(&self) -> Result<Vec<SceneRecord>, DomainError> {
        Err(DomainError::Infrastructure("story fetch failed".to_owned()))
    }
}
