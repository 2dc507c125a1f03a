//! Domain model for story traversal.

pub mod choices;
pub mod commands;
pub mod engine;
pub mod events;
pub mod graph;
pub mod inventory;
