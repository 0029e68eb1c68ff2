//! Core library for StackMate, a developer dashboard with local notes and
//! `@trigger` search routing.
//!
//! The two entry points are [`NoteStore`], which owns every saved note and
//! its SQLite file, and the pure functions in [`trigger`], which turn search
//! text into a destination view. [`Dashboard`] and [`NoteComposer`] hold the
//! transient view-state that sits between the two.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

#[doc(inline)]
pub use core::{services, trigger};

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    composer::NoteComposer,
    dashboard::Dashboard,
    error::{Result, StackmateError},
    note::{derive_title, Note},
    note_store::{display_order, NoteStore},
    storage::Storage,
    trigger::{Dispatch, HighlightToken, TriggerKind, TriggerQuery, ViewId},
};
