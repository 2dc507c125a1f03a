//! Choice gating.

use std::fmt;

use super::graph::Choice;
use super::inventory::Inventory;

/// Why a visible choice cannot currently be picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisabledReason {
    /// The choice requires an item that is not held.
    MissingItem {
        /// The required item key.
        item: String,
    },
    /// The choice requires more score than the player has.
    InsufficientScore {
        /// Minimum score required.
        required: i64,
        /// The player's current score.
        current: i64,
    },
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingItem { item } => write!(f, "You need the '{item}' item."),
            Self::InsufficientScore { required, .. } => {
                write!(f, "You need {required} score to do this.")
            }
        }
    }
}

/// A choice of the current scene together with its availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableChoice {
    /// Position of the choice within its scene.
    pub index: usize,
    /// The choice itself.
    pub choice: Choice,
    /// Why the choice is disabled, if it is.
    pub reason: Option<DisabledReason>,
}

impl AvailableChoice {
    /// Returns `true` if the choice cannot currently be picked.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.reason.is_some()
    }
}

/// Checks a choice's requirements. A missing item takes precedence over a
/// score shortfall when both apply.
#[must_use]
pub fn gate(choice: &Choice, score: i64, inventory: &Inventory) -> Option<DisabledReason> {
    if let Some(item) = &choice.required_item
        && !inventory.contains(item)
    {
        return Some(DisabledReason::MissingItem { item: item.clone() });
    }
    match choice.required_score {
        Some(required) if score < required => Some(DisabledReason::InsufficientScore {
            required,
            current: score,
        }),
        _ => None,
    }
}
