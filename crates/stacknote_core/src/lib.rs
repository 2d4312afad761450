//! Core domain logic for Stacknote.
//! This crate is the single source of truth for list-ordering invariants.

pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod repo;
pub mod service;

pub use event::ChangeEvent;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{now_epoch_ms, Item, ItemId, ItemValidationError};
pub use presenter::list_presenter::{derive_row_title, DisplayRow, ListPresenter, PresenterError};
pub use repo::item_repo::{
    resolve_target_index, ItemRepository, RepoError, RepoResult, SqliteItemRepository,
};
pub use service::item_service::{ItemService, ItemServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
