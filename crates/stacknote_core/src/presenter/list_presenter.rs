//! List presenter: renders the store snapshot and forwards gestures.
//!
//! # Responsibility
//! - Project the store's ordered items into display rows.
//! - Translate list gestures (add, edit, delete set, move) into store calls.
//!
//! # Invariants
//! - Ordering authority stays in the store: rows are never sorted,
//!   filtered or renumbered here.
//! - Move gestures forward raw indices to the store unmodified.
//! - Delete gestures resolve their index set against the snapshot the user
//!   was looking at, before any row is removed.
//!
//! # See also
//! - docs/architecture/item-store.md

use crate::event::ChangeEvent;
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::ItemRepository;
use crate::service::item_service::{ItemService, ItemServiceError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const ROW_TITLE_MAX_CHARS: usize = 80;

/// Errors from list presenter gestures.
#[derive(Debug)]
pub enum PresenterError {
    /// Gesture index does not hit a rendered row.
    RowOutOfRange { index: usize, len: usize },
    /// Forwarded store failure.
    Store(ItemServiceError),
}

impl Display for PresenterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowOutOfRange { index, len } => {
                write!(f, "row index {index} is out of range for {len} rows")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PresenterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemServiceError> for PresenterError {
    fn from(value: ItemServiceError) -> Self {
        Self::Store(value)
    }
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Backing item id, used to address edit and delete gestures.
    pub item_id: ItemId,
    /// Single-line row title derived from the item text.
    pub title: String,
    /// Creation time in epoch milliseconds, for the caption column.
    pub created_at: i64,
}

/// Thin list presenter over the item store.
///
/// The presenter subscribes to committed-change events on construction and
/// re-queries the store at most once per drained batch.
pub struct ListPresenter<R: ItemRepository> {
    store: ItemService<R>,
    events: Receiver<ChangeEvent>,
    rows: Vec<DisplayRow>,
}

impl<R: ItemRepository> ListPresenter<R> {
    /// Creates a presenter subscribed to the store and loads the first
    /// snapshot.
    pub fn new(mut store: ItemService<R>) -> Result<Self, PresenterError> {
        let events = store.subscribe();
        let mut presenter = Self {
            store,
            events,
            rows: Vec::new(),
        };
        presenter.reload()?;
        Ok(presenter)
    }

    /// Returns the current rows in display order.
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    /// Drains pending change notifications and re-queries the store once
    /// when any arrived. Returns whether the rows were reloaded.
    pub fn refresh_if_changed(&mut self) -> Result<bool, PresenterError> {
        let mut changed = false;
        while self.events.try_recv().is_ok() {
            changed = true;
        }
        if changed {
            self.reload()?;
        }
        Ok(changed)
    }

    /// Add gesture: creates one item from entered text and returns its id.
    pub fn add_item(&mut self, text: impl Into<String>) -> Result<ItemId, PresenterError> {
        let created = self.store.create_item(text)?;
        self.refresh_if_changed()?;
        Ok(created.uuid)
    }

    /// Edit gesture: replaces the text of the row's backing item.
    /// Timestamp and rank stay untouched.
    pub fn edit_item(
        &mut self,
        id: ItemId,
        new_text: impl Into<String>,
    ) -> Result<(), PresenterError> {
        self.store.update_text(id, new_text)?;
        self.refresh_if_changed()?;
        Ok(())
    }

    /// Delete gesture: removes the rows at `indices`.
    ///
    /// Duplicate indices collapse. All indices address the snapshot
    /// currently on screen and are resolved to ids before the first
    /// removal, so earlier deletes cannot skew later ones.
    pub fn delete_rows(&mut self, indices: &[usize]) -> Result<(), PresenterError> {
        let len = self.rows.len();
        let mut ids = Vec::new();
        for index in indices.iter().copied().collect::<BTreeSet<_>>() {
            let row = self
                .rows
                .get(index)
                .ok_or(PresenterError::RowOutOfRange { index, len })?;
            ids.push(row.item_id);
        }

        for id in ids {
            self.store.delete_item(id)?;
        }
        self.refresh_if_changed()?;
        Ok(())
    }

    /// Move gesture: forwards the raw source/destination indices to the
    /// store's reorder operation.
    pub fn move_row(
        &mut self,
        source_index: usize,
        destination_index: usize,
    ) -> Result<(), PresenterError> {
        self.store.reorder_item(source_index, destination_index)?;
        self.refresh_if_changed()?;
        Ok(())
    }

    fn reload(&mut self) -> Result<(), PresenterError> {
        let items = self.store.list_items()?;
        self.rows = items.iter().map(to_display_row).collect();
        Ok(())
    }
}

/// Derives the single-line row title shown in the list.
///
/// # Contract
/// - Whitespace runs (including newlines) collapse to one space.
/// - Result is trimmed and limited to the first 80 chars.
pub fn derive_row_title(text: &str) -> String {
    let normalized = WHITESPACE_RE.replace_all(text, " ");
    normalized.trim().chars().take(ROW_TITLE_MAX_CHARS).collect()
}

fn to_display_row(item: &Item) -> DisplayRow {
    DisplayRow {
        item_id: item.uuid,
        title: derive_row_title(item.text.as_str()),
        created_at: item.created_at,
    }
}
