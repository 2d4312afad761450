//! Committed-change notifications for store subscribers.
//!
//! # Responsibility
//! - Describe every committed store mutation as one event value.
//! - Keep payloads small and serializable for downstream consumers.
//!
//! # Invariants
//! - Events are emitted only after the owning write has committed.
//! - A reorder that resolves to the item's current position emits nothing.

use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};

/// One committed store mutation.
///
/// The list presenter treats any event as "re-query the store". Replication
/// consumers may instead use the payload to mirror records incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A new item was inserted at the end of the user ordering.
    Created { item_id: ItemId },
    /// An existing item's text was replaced.
    Updated { item_id: ItemId },
    /// An item was permanently removed.
    Deleted { item_id: ItemId },
    /// An item moved to a new resolved position in the ordering.
    Moved { item_id: ItemId, target_index: usize },
}

impl ChangeEvent {
    /// Returns the id of the item this event is about.
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Created { item_id }
            | Self::Updated { item_id }
            | Self::Deleted { item_id }
            | Self::Moved { item_id, .. } => *item_id,
        }
    }
}
