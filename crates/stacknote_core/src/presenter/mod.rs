//! Presentation-facing read models and gesture translation.
//!
//! # Responsibility
//! - Keep list rendering thin: query, display, forward gestures.
//! - Own no ordering or lifecycle rules of its own.

pub mod list_presenter;
