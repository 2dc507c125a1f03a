//! The player's inventory.

use std::collections::BTreeSet;

use serde::Serialize;

/// A set of held item keys.
///
/// Granting an item that is already held is a no-op. Iteration order is
/// sorted so persisted snapshots are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeSet<String>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants an item. Returns `true` if it was not already held.
    pub fn grant(&mut self, item: impl Into<String>) -> bool {
        self.items.insert(item.into())
    }

    /// Returns `true` if the item is held.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    /// Number of distinct items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates held item keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Snapshot of held item keys in sorted order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Inventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}
