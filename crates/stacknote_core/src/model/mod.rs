//! Domain model for the ordered item list.
//!
//! # Responsibility
//! - Define the canonical data structures used by core store logic.
//! - Keep one record shape shared by persistence and presentation.
//!
//! # Invariants
//! - Every domain object is identified by a stable `ItemId`.
//! - Deletion is permanent: the model carries no tombstone state.
//!
//! # See also
//! - docs/architecture/item-store.md

pub mod item;
