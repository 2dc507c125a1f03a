//! Shared test fakes and utilities for Storyweave.
//!
//! Every port in `storyweave_core::ports` has an in-memory fake that records
//! writes and a failing fake that returns `DomainError::Infrastructure` from
//! every call.

mod achievements;
mod clock;
mod profiles;
mod scores;
mod stories;

pub use achievements::{FailingAchievementService, RecordingAchievementService};
pub use clock::FixedClock;
pub use profiles::{FailingProfileStore, InMemoryProfileStore};
pub use scores::{FailingScoreLedger, InMemoryScoreLedger};
pub use stories::{FailingStoryRepository, InMemoryStoryRepository};
