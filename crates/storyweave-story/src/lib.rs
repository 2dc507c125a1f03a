//! Storyweave — story traversal.
//!
//! Responsible for validating the scene graph, gating choices on inventory
//! and score, applying transitions, and dispatching the resulting progress,
//! achievement, and high-score side effects to collaborators.

pub mod application;
pub mod domain;
