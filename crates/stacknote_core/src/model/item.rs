//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical list-item record (id, text, timestamp, rank).
//! - Provide construction and validation helpers shared by store layers.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another item.
//! - `created_at` is stamped once at construction and never edited.
//! - `sort_order` is owned by the store: it changes only through insert
//!   placement and explicit reorder operations.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every item in the store.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = Uuid;

/// Structural validation failures for item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    /// The nil UUID is reserved and never a legal item id.
    NilUuid,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "item uuid must not be the nil uuid"),
        }
    }
}

impl Error for ItemValidationError {}

/// Canonical list-item record.
///
/// `sort_order` ranks items for display. Deletion leaves gaps in the rank
/// sequence, so values are not contiguous; sorting ascending (with
/// `created_at DESC, uuid ASC` as tie-breaks) always reproduces the user's
/// arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable global ID used for lookups, gesture targets and replication.
    pub uuid: ItemId,
    /// User-entered body text. Empty text is legal.
    pub text: String,
    /// Creation time in Unix epoch milliseconds. Immutable after creation.
    pub created_at: i64,
    /// Integer rank controlled by explicit reordering. The store assigns
    /// the real value on insert; the constructor value is a placeholder.
    pub sort_order: i64,
}

impl Item {
    /// Creates a new item stamped with the current wall-clock time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            text: text.into(),
            created_at: now_epoch_ms(),
            sort_order: 0,
        }
    }

    /// Creates a new item with a caller-provided stable ID.
    ///
    /// Used by import paths and tests where identity already exists.
    ///
    /// # Errors
    /// - `ItemValidationError::NilUuid` when `uuid` is the nil uuid.
    pub fn with_id(uuid: ItemId, text: impl Into<String>) -> Result<Self, ItemValidationError> {
        let item = Self {
            uuid,
            text: text.into(),
            created_at: now_epoch_ms(),
            sort_order: 0,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks structural invariants shared by write and read paths.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.uuid.is_nil() {
            return Err(ItemValidationError::NilUuid);
        }
        Ok(())
    }
}

/// Returns the current wall-clock time in Unix epoch milliseconds.
///
/// Clamps instead of failing: a pre-epoch clock yields `0` and an
/// out-of-range duration yields `i64::MAX`.
pub fn now_epoch_ms() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(_) => 0,
    }
}
