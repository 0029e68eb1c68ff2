//! Unsaved note-composition state. Nothing here is ever persisted.

use crate::{Note, NoteStore, Result, StackmateError};

/// The draft buffer behind the "new note" text area, plus its warning flag.
///
/// Only a successful [`submit`](Self::submit) moves text into the
/// [`NoteStore`]; the draft itself never reaches durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteComposer {
    draft: String,
    warning: bool,
}

impl NoteComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether the last submit was rejected for empty content.
    pub fn warning(&self) -> bool {
        self.warning
    }

    /// Replaces the draft. Any edit dismisses a pending warning.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.warning = false;
    }

    /// Saves the draft as a new note and clears it on success.
    ///
    /// # Errors
    ///
    /// On [`StackmateError::EmptyContent`] the warning flag is raised and the
    /// draft is kept. Other store errors leave the composer untouched.
    pub fn submit(&mut self, store: &mut NoteStore) -> Result<Note> {
        match store.save(&self.draft) {
            Ok(note) => {
                self.clear_draft();
                Ok(note)
            }
            Err(StackmateError::EmptyContent) => {
                self.warning = true;
                Err(StackmateError::EmptyContent)
            }
            Err(e) => Err(e),
        }
    }

    /// Discards the in-progress draft and any warning.
    pub fn clear_draft(&mut self) {
        self.draft.clear();
        self.warning = false;
    }
}
