//! The validated scene graph.

use std::collections::HashMap;

use serde::Serialize;
use sha2::{Digest, Sha256};
use storyweave_core::error::DomainError;
use storyweave_core::ports::{ChoiceRecord, SceneRecord};

/// Conventional key of the scene every story starts at.
pub const DEFAULT_START_SCENE_KEY: &str = "start";

/// Conventional key of the closing scene.
pub const DEFAULT_END_SCENE_KEY: &str = "endGame";

/// A directed, optionally gated edge between two scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Display text.
    pub text: String,
    /// Key of the scene this choice leads to.
    pub target: String,
    /// Item that must be held.
    pub required_item: Option<String>,
    /// Minimum score.
    pub required_score: Option<i64>,
}

/// A node of the story graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    /// Unique key.
    pub key: String,
    /// Display text.
    pub text: String,
    /// Score awarded on arrival.
    pub score_delta: Option<i64>,
    /// Item granted on arrival.
    pub grants_item: Option<String>,
    /// Achievement granted on arrival.
    pub grants_achievement: Option<String>,
    /// Outgoing choices in declared order.
    pub choices: Vec<Choice>,
}

impl From<ChoiceRecord> for Choice {
    fn from(record: ChoiceRecord) -> Self {
        Self {
            text: record.text,
            target: record.target_scene_key,
            required_item: record.required_item,
            required_score: record.required_score,
        }
    }
}

impl From<SceneRecord> for Scene {
    fn from(record: SceneRecord) -> Self {
        Self {
            key: record.key,
            text: record.text,
            score_delta: record.score_delta,
            grants_item: record.grants_item,
            grants_achievement: record.grants_achievement,
            choices: record.choices.into_iter().map(Choice::from).collect(),
        }
    }
}

/// An immutable, validated scene graph.
///
/// Construction guarantees that the start scene exists, scene keys are
/// unique, and every choice target resolves to a scene in the graph.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    scenes: Vec<Scene>,
    index: HashMap<String, usize>,
    start_index: usize,
    end_key: String,
    fingerprint: String,
}

impl StoryGraph {
    /// Builds a graph using the conventional `start` / `endGame` keys.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Structural` if the records do not form a valid
    /// graph.
    pub fn from_records(records: Vec<SceneRecord>) -> Result<Self, DomainError> {
        Self::with_keys(records, DEFAULT_START_SCENE_KEY, DEFAULT_END_SCENE_KEY)
    }

    /// Builds a graph with explicit start and end scene keys.
    ///
    /// All problems are collected and reported together.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Structural` listing every duplicate key, the
    /// missing start scene, and every dangling choice target.
    pub fn with_keys(
        records: Vec<SceneRecord>,
        start_key: &str,
        end_key: &str,
    ) -> Result<Self, DomainError> {
        let fingerprint = fingerprint_of(&records);
        let scenes: Vec<Scene> = records.into_iter().map(Scene::from).collect();

        let mut problems = Vec::new();
        let mut index = HashMap::with_capacity(scenes.len());
        for (position, scene) in scenes.iter().enumerate() {
            if index.insert(scene.key.clone(), position).is_some() {
                problems.push(format!("duplicate scene key '{}'", scene.key));
            }
        }

        let start_index = index.get(start_key).copied();
        if start_index.is_none() {
            problems.push(format!("start scene '{start_key}' is missing"));
        }

        for scene in &scenes {
            for (choice_index, choice) in scene.choices.iter().enumerate() {
                if !index.contains_key(&choice.target) {
                    problems.push(format!(
                        "scene '{}' choice {choice_index} targets unknown scene '{}'",
                        scene.key, choice.target
                    ));
                }
            }
        }

        match start_index {
            Some(start_index) if problems.is_empty() => Ok(Self {
                scenes,
                index,
                start_index,
                end_key: end_key.to_owned(),
                fingerprint,
            }),
            _ => Err(DomainError::Structural(problems.join("; "))),
        }
    }

    /// Looks up a scene by key.
    #[must_use]
    pub fn scene(&self, key: &str) -> Option<&Scene> {
        self.index.get(key).map(|&position| &self.scenes[position])
    }

    /// Returns `true` if the graph has a scene with this key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The scene every session starts at.
    #[must_use]
    pub fn start_scene(&self) -> &Scene {
        &self.scenes[self.start_index]
    }

    /// Key of the start scene.
    #[must_use]
    pub fn start_key(&self) -> &str {
        &self.start_scene().key
    }

    /// Key of the designated end scene.
    #[must_use]
    pub fn end_key(&self) -> &str {
        &self.end_key
    }

    /// A scene is terminal when it is the designated end scene, or when any
    /// of its choices leads back to the start scene. The start scene itself
    /// is never terminal.
    #[must_use]
    pub fn is_terminal(&self, key: &str) -> bool {
        let start_key = self.start_key();
        if key == start_key {
            return false;
        }
        if key == self.end_key {
            return true;
        }
        self.scene(key)
            .is_some_and(|scene| scene.choices.iter().any(|c| c.target == start_key))
    }

    /// Hex SHA-256 of the graph content, independent of record order.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Returns `true` if the graph has no scenes. A validated graph always
    /// has at least the start scene.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

fn fingerprint_of(records: &[SceneRecord]) -> String {
    let mut sorted: Vec<&SceneRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut hasher = Sha256::new();
    for scene in sorted {
        hash_field(&mut hasher, &scene.key);
        hash_field(&mut hasher, &scene.text);
        hash_optional(&mut hasher, scene.score_delta.map(|d| d.to_string()).as_deref());
        hash_optional(&mut hasher, scene.grants_item.as_deref());
        hash_optional(&mut hasher, scene.grants_achievement.as_deref());
        for choice in &scene.choices {
            hash_field(&mut hasher, &choice.text);
            hash_field(&mut hasher, &choice.target_scene_key);
            hash_optional(&mut hasher, choice.required_item.as_deref());
            hash_optional(
                &mut hasher,
                choice.required_score.map(|s| s.to_string()).as_deref(),
            );
        }
        hasher.update([0xff]);
    }
    format!("{:x}", hasher.finalize())
}

fn hash_field(hasher: &mut Sha256, value: &str) {
    hasher.update(value.len().to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1]);
            hash_field(hasher, value);
        }
        None => hasher.update([0]),
    }
}
