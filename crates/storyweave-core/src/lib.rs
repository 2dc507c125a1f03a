//! Storyweave Core — shared domain abstractions.
//!
//! This crate defines the error taxonomy, event envelope, clock, and the
//! narrow collaborator ports (story repository, profile store, achievement
//! service, score ledger) that the story engine talks to. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ports;
