//! Item store use-case service.
//!
//! # Responsibility
//! - Provide the store facade: create, edit, delete, reorder, query.
//! - Fan out committed-change notifications to registered subscribers.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Mutations are serialized by single ownership of the backing connection;
//!   the service adds no locking of its own.
//! - Events are sent only after the repository reports a committed write.
//! - A reorder that resolves to the item's current position emits nothing.

use crate::event::ChangeEvent;
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{resolve_target_index, ItemRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};

/// Service error for item store use-cases.
#[derive(Debug)]
pub enum ItemServiceError {
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Gesture index outside the current list bounds.
    OutOfRange { index: usize, len: usize },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(item_id) => write!(f, "item not found: {item_id}"),
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a list of {len} items")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent item state: {details}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(item_id) => Self::ItemNotFound(item_id),
            RepoError::InvalidRange { index, len } => Self::OutOfRange { index, len },
            other => Self::Repo(other),
        }
    }
}

/// Item store facade over repository implementations.
///
/// The facade owns the subscriber list; every committed mutation is
/// broadcast to all receivers registered through [`ItemService::subscribe`].
pub struct ItemService<R: ItemRepository> {
    repo: R,
    subscribers: Vec<Sender<ChangeEvent>>,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            subscribers: Vec::new(),
        }
    }

    /// Registers one change subscriber and returns its receiving end.
    ///
    /// The receiver observes every event committed after this call.
    /// Dropped receivers are skipped silently on emit.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Creates one item from entered text, appended to the end of the
    /// user ordering.
    pub fn create_item(&self, text: impl Into<String>) -> Result<Item, ItemServiceError> {
        let item = Item::new(text);
        let stored = self.repo.insert_item(&item)?;
        self.emit(ChangeEvent::Created {
            item_id: stored.uuid,
        });
        Ok(stored)
    }

    /// Replaces one item's text, preserving id, timestamp and rank.
    ///
    /// Returns the stored row as read back after the write.
    pub fn update_text(
        &self,
        id: ItemId,
        text: impl Into<String>,
    ) -> Result<Item, ItemServiceError> {
        let text = text.into();
        self.repo.update_item_text(id, text.as_str())?;
        let stored = self
            .repo
            .get_item(id)?
            .ok_or(ItemServiceError::InconsistentState(
                "updated item not found in read-back",
            ))?;
        self.emit(ChangeEvent::Updated { item_id: id });
        Ok(stored)
    }

    /// Permanently removes one item. Remaining ranks keep their gaps.
    pub fn delete_item(&self, id: ItemId) -> Result<(), ItemServiceError> {
        self.repo.delete_item(id)?;
        self.emit(ChangeEvent::Deleted { item_id: id });
        Ok(())
    }

    /// Moves the item at `source_index` to the raw gesture destination.
    ///
    /// Raw destinations range over `0..=len`; `len` drops the item past
    /// the final row. A gesture that resolves to the item's current
    /// position succeeds without emitting.
    pub fn reorder_item(
        &self,
        source_index: usize,
        destination_index: usize,
    ) -> Result<(), ItemServiceError> {
        if let Some(item_id) = self.repo.reorder_item(source_index, destination_index)? {
            self.emit(ChangeEvent::Moved {
                item_id,
                target_index: resolve_target_index(source_index, destination_index),
            });
        }
        Ok(())
    }

    /// Gets one item by stable ID.
    pub fn get_item(&self, id: ItemId) -> Result<Option<Item>, ItemServiceError> {
        self.repo.get_item(id).map_err(Into::into)
    }

    /// Lists all items in display order.
    pub fn list_items(&self) -> Result<Vec<Item>, ItemServiceError> {
        self.repo.list_items().map_err(Into::into)
    }

    fn emit(&self, event: ChangeEvent) {
        for subscriber in &self.subscribers {
            // A send failure means the receiver was dropped, not a fault.
            let _ = subscriber.send(event.clone());
        }
    }
}
