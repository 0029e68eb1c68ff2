//! Internal domain modules for the StackMate core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod composer;
pub mod dashboard;
pub mod error;
pub mod note;
pub mod note_store;
pub mod services;
pub mod storage;
pub mod trigger;

#[doc(inline)]
pub use composer::NoteComposer;
#[doc(inline)]
pub use dashboard::Dashboard;
#[doc(inline)]
pub use error::{Result, StackmateError};
#[doc(inline)]
pub use note::Note;
#[doc(inline)]
pub use note_store::NoteStore;
#[doc(inline)]
pub use storage::Storage;
