//! The canonical note collection, backed by a SQLite file.

use crate::core::note::derive_title;
use crate::{Note, Result, StackmateError, Storage};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::cmp::Ordering;
use std::path::Path;
use uuid::Uuid;

/// Owns every saved [`Note`] and is the only component allowed to mutate them.
///
/// Each mutation runs in its own SQLite transaction and the in-memory copy is
/// touched only after that transaction commits, so a failed write leaves both
/// the file and the cache exactly as they were.
pub struct NoteStore {
    storage: Storage,
    notes: Vec<Note>,
    last_timestamp: i64,
}

/// Display order: pinned first, then most recently edited, then by id.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then(b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

impl NoteStore {
    /// Creates a new, empty store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::StorageUnavailable`] if the database cannot be initialised.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_storage(Storage::create(path)?)
    }

    /// Opens an existing store and loads every note into memory.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::InvalidStore`] if the file is not a StackMate
    /// store, or [`StackmateError::StorageUnavailable`] for any SQLite failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_storage(Storage::open(path)?)
    }

    /// Opens the store at `path`, creating it (and its parent directory) if absent.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_storage(Storage::open_or_create(path)?)
    }

    fn from_storage(storage: Storage) -> Result<Self> {
        let notes = load_all(storage.connection())?;
        let last_timestamp = notes
            .iter()
            .map(|n| n.updated_at.max(n.created_at))
            .max()
            .unwrap_or(0);
        info!("Loaded {} notes", notes.len());
        Ok(Self {
            storage,
            notes,
            last_timestamp,
        })
    }

    /// Returns the underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        self.storage.connection()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Returns all notes in display order, optionally restricted to those whose
    /// content or title contains `filter` (case-insensitive).
    pub fn list(&self, filter: Option<&str>) -> Vec<Note> {
        let needle = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        let mut notes: Vec<Note> = match &needle {
            Some(needle) => self
                .notes
                .iter()
                .filter(|n| n.matches(needle))
                .cloned()
                .collect(),
            None => self.notes.clone(),
        };
        notes.sort_by(display_order);
        debug!("Listing {} notes (filter: {:?})", notes.len(), needle);
        notes
    }

    /// Fetches a single note by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::NoteNotFound`] if `note_id` is unknown.
    pub fn get(&self, note_id: &str) -> Result<Note> {
        self.position(note_id).map(|idx| self.notes[idx].clone())
    }

    /// Saves `content` as a new note and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::EmptyContent`] if `content` is blank, or
    /// [`StackmateError::StorageUnavailable`] if the insert fails.
    pub fn save(&mut self, content: &str) -> Result<Note> {
        let content = content.trim();
        if content.is_empty() {
            warn!("Rejected save of empty note");
            return Err(StackmateError::EmptyContent);
        }

        let now = self.next_timestamp();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            title: derive_title(content),
            pinned: false,
            created_at: now,
            updated_at: now,
        };

        let tx = self.storage.connection_mut().transaction()?;
        tx.execute(
            "INSERT INTO notes (id, content, title, pinned, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                note.id,
                note.content,
                note.title,
                note.pinned,
                note.created_at,
                note.updated_at,
            ],
        )?;
        tx.commit()?;

        self.notes.push(note.clone());
        info!("Saved note {}", note.id);
        Ok(note)
    }

    /// Renames `note_id`. A blank title resets it to the one derived from content.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::NoteNotFound`] if `note_id` is unknown, or
    /// [`StackmateError::StorageUnavailable`] if the update fails.
    pub fn rename(&mut self, note_id: &str, new_title: &str) -> Result<Note> {
        let idx = self.position(note_id)?;
        let mut note = self.notes[idx].clone();
        note.title = match new_title.trim() {
            "" => derive_title(&note.content),
            title => title.to_string(),
        };
        note.updated_at = self.next_timestamp();

        self.write(idx, note)
    }

    /// Replaces the content of `note_id`. The title is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::EmptyContent`] if `new_content` is blank,
    /// [`StackmateError::NoteNotFound`] if `note_id` is unknown, or
    /// [`StackmateError::StorageUnavailable`] if the update fails.
    pub fn edit_content(&mut self, note_id: &str, new_content: &str) -> Result<Note> {
        let idx = self.position(note_id)?;
        let new_content = new_content.trim();
        if new_content.is_empty() {
            warn!("Rejected empty content for note {}", note_id);
            return Err(StackmateError::EmptyContent);
        }

        let mut note = self.notes[idx].clone();
        note.content = new_content.to_string();
        note.updated_at = self.next_timestamp();

        self.write(idx, note)
    }

    /// Flips the pinned flag of `note_id`. Timestamps are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::NoteNotFound`] if `note_id` is unknown, or
    /// [`StackmateError::StorageUnavailable`] if the update fails.
    pub fn toggle_pin(&mut self, note_id: &str) -> Result<Note> {
        let idx = self.position(note_id)?;
        let mut note = self.notes[idx].clone();
        note.pinned = !note.pinned;

        self.write(idx, note)
    }

    /// Permanently removes `note_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::NoteNotFound`] if `note_id` is unknown, or
    /// [`StackmateError::StorageUnavailable`] if the delete fails.
    pub fn delete(&mut self, note_id: &str) -> Result<()> {
        let idx = self.position(note_id)?;

        let tx = self.storage.connection_mut().transaction()?;
        tx.execute("DELETE FROM notes WHERE id = ?", [note_id])?;
        let removed = tx.changes();
        tx.commit()?;

        self.notes.remove(idx);
        if removed == 0 {
            warn!("Note {} was already gone from the store file", note_id);
            return Err(StackmateError::NoteNotFound(note_id.to_string()));
        }

        info!("Deleted note {}", note_id);
        Ok(())
    }

    /// Persists `note` over the row with the same id, then replaces the cached copy at `idx`.
    fn write(&mut self, idx: usize, note: Note) -> Result<Note> {
        let tx = self.storage.connection_mut().transaction()?;
        tx.execute(
            "UPDATE notes SET content = ?1, title = ?2, pinned = ?3, updated_at = ?4 WHERE id = ?5",
            rusqlite::params![note.content, note.title, note.pinned, note.updated_at, note.id],
        )?;

        // The row can vanish underneath us if another process deleted it; drop
        // the stale cached copy so the listing stops showing it.
        if tx.changes() == 0 {
            drop(tx);
            self.notes.remove(idx);
            warn!("Note {} vanished from the store file", note.id);
            return Err(StackmateError::NoteNotFound(note.id));
        }
        tx.commit()?;

        info!("Updated note {}", note.id);
        self.notes[idx] = note.clone();
        Ok(note)
    }

    fn position(&self, note_id: &str) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == note_id)
            .ok_or_else(|| StackmateError::NoteNotFound(note_id.to_string()))
    }

    /// Wall-clock milliseconds, forced strictly above every timestamp issued so far.
    fn next_timestamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_timestamp = now.max(self.last_timestamp.saturating_add(1));
        self.last_timestamp
    }
}

/// Raw 6-column tuple extracted from a `notes` row.
type NoteRow = (String, String, String, i64, i64, i64);

fn map_note_row(row: &rusqlite::Row) -> rusqlite::Result<NoteRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, i64>(3)?,
        row.get::<_, i64>(4)?,
        row.get::<_, i64>(5)?,
    ))
}

fn note_from_row_tuple((id, content, title, pinned, created_at, updated_at): NoteRow) -> Note {
    Note {
        id,
        content,
        title,
        pinned: pinned != 0,
        created_at,
        updated_at,
    }
}

fn load_all(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, title, pinned, created_at, updated_at FROM notes",
    )?;
    let rows = stmt
        .query_map([], map_note_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().map(note_from_row_tuple).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn new_store() -> (NamedTempFile, NoteStore) {
        let temp = NamedTempFile::new().unwrap();
        let store = NoteStore::create(temp.path()).unwrap();
        (temp, store)
    }

    fn contents(store: &NoteStore, filter: Option<&str>) -> Vec<String> {
        store.list(filter).into_iter().map(|n| n.content).collect()
    }

    #[test]
    fn test_save_and_list() {
        let (_temp, mut store) = new_store();
        let note = store.save("buy milk").unwrap();

        let notes = store.list(None);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "buy milk");
        assert_eq!(notes[0].id, note.id);
        assert!(!note.id.is_empty());
        assert_eq!(note.title, "buy milk");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_save_trims_content() {
        let (_temp, mut store) = new_store();
        let note = store.save("  walk dog \n").unwrap();
        assert_eq!(note.content, "walk dog");
    }

    #[test]
    fn test_save_empty_content_is_rejected() {
        let (_temp, mut store) = new_store();
        store.save("keep").unwrap();

        for blank in ["", "   ", "\n\t "] {
            let result = store.save(blank);
            assert!(matches!(result, Err(StackmateError::EmptyContent)));
            assert_eq!(store.list(None).len(), 1);
        }

        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_temp, mut store) = new_store();
        let a = store.save("same").unwrap();
        let b = store.save("same").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_most_recent_edit_first() {
        let (_temp, mut store) = new_store();
        let a = store.save("a").unwrap();
        store.save("b").unwrap();
        assert_eq!(contents(&store, None), vec!["b", "a"]);

        store.edit_content(&a.id, "a2").unwrap();
        assert_eq!(contents(&store, None), vec!["a2", "b"]);
    }

    #[test]
    fn test_toggle_pin_moves_note_first_and_back() {
        let (_temp, mut store) = new_store();
        store.save("a").unwrap();
        let b = store.save("b").unwrap();
        store.save("c").unwrap();
        assert_eq!(contents(&store, None), vec!["c", "b", "a"]);

        let pinned = store.toggle_pin(&b.id).unwrap();
        assert!(pinned.pinned);
        assert_eq!(pinned.updated_at, b.updated_at, "pinning must not bump updated_at");
        assert_eq!(contents(&store, None), vec!["b", "c", "a"]);

        store.toggle_pin(&b.id).unwrap();
        assert_eq!(contents(&store, None), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_pinned_notes_keep_recency_order_among_themselves() {
        let (_temp, mut store) = new_store();
        let a = store.save("a").unwrap();
        let b = store.save("b").unwrap();
        store.save("c").unwrap();
        store.toggle_pin(&a.id).unwrap();
        store.toggle_pin(&b.id).unwrap();

        assert_eq!(contents(&store, None), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_list_filter_is_case_insensitive() {
        let (_temp, mut store) = new_store();
        store.save("buy milk").unwrap();
        store.save("walk dog").unwrap();

        assert_eq!(contents(&store, Some("milk")), vec!["buy milk"]);
        assert_eq!(contents(&store, Some("MILK")), vec!["buy milk"]);
        assert_eq!(contents(&store, Some("")).len(), 2);
        assert_eq!(contents(&store, Some("   ")).len(), 2);
        assert!(contents(&store, Some("cat")).is_empty());
    }

    #[test]
    fn test_list_filter_matches_renamed_title() {
        let (_temp, mut store) = new_store();
        let note = store.save("2 litres, semi-skimmed").unwrap();
        store.save("walk dog").unwrap();
        store.rename(&note.id, "Groceries").unwrap();

        assert_eq!(contents(&store, Some("grocer")), vec!["2 litres, semi-skimmed"]);
    }

    #[test]
    fn test_rename_updates_title_only() {
        let (_temp, mut store) = new_store();
        let note = store.save("buy milk").unwrap();

        let renamed = store.rename(&note.id, "  groceries ").unwrap();
        assert_eq!(renamed.title, "groceries");
        assert_eq!(renamed.content, "buy milk");
        assert!(renamed.updated_at > note.updated_at);
    }

    #[test]
    fn test_blank_rename_restores_derived_title() {
        let (_temp, mut store) = new_store();
        let note = store.save("buy milk").unwrap();
        store.rename(&note.id, "groceries").unwrap();

        let reset = store.rename(&note.id, "  ").unwrap();
        assert_eq!(reset.title, "buy milk");
    }

    #[test]
    fn test_edit_content_keeps_renamed_title() {
        let (_temp, mut store) = new_store();
        let note = store.save("buy milk").unwrap();
        store.rename(&note.id, "groceries").unwrap();

        let edited = store.edit_content(&note.id, "buy oat milk").unwrap();
        assert_eq!(edited.content, "buy oat milk");
        assert_eq!(edited.title, "groceries");
    }

    #[test]
    fn test_edit_content_rejects_blank() {
        let (_temp, mut store) = new_store();
        let note = store.save("buy milk").unwrap();

        let result = store.edit_content(&note.id, "  ");
        assert!(matches!(result, Err(StackmateError::EmptyContent)));
        assert_eq!(store.get(&note.id).unwrap(), note);
    }

    #[test]
    fn test_operations_on_deleted_note_fail() {
        let (_temp, mut store) = new_store();
        let note = store.save("gone soon").unwrap();
        store.delete(&note.id).unwrap();

        assert!(matches!(store.get(&note.id), Err(StackmateError::NoteNotFound(_))));
        assert!(matches!(store.rename(&note.id, "x"), Err(StackmateError::NoteNotFound(_))));
        assert!(matches!(
            store.edit_content(&note.id, "x"),
            Err(StackmateError::NoteNotFound(_))
        ));
        assert!(matches!(store.toggle_pin(&note.id), Err(StackmateError::NoteNotFound(_))));
        assert!(matches!(store.delete(&note.id), Err(StackmateError::NoteNotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_removes_row() {
        let (_temp, mut store) = new_store();
        let note = store.save("temp").unwrap();
        store.delete(&note.id).unwrap();

        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reopen_round_trip() {
        let temp = NamedTempFile::new().unwrap();
        let before = {
            let mut store = NoteStore::create(temp.path()).unwrap();
            let a = store.save("buy milk").unwrap();
            let b = store.save("walk dog\nafter lunch").unwrap();
            store.toggle_pin(&a.id).unwrap();
            store.rename(&b.id, "dog").unwrap();
            store.list(None)
        };

        let store = NoteStore::open(temp.path()).unwrap();
        assert_eq!(store.list(None), before);
    }

    #[test]
    fn test_timestamps_stay_monotonic_after_reopen() {
        let temp = NamedTempFile::new().unwrap();
        let first = {
            let mut store = NoteStore::create(temp.path()).unwrap();
            store.save("first").unwrap()
        };

        let mut store = NoteStore::open(temp.path()).unwrap();
        let second = store.save("second").unwrap();
        assert!(second.created_at > first.created_at);
        assert_eq!(contents(&store, None), vec!["second", "first"]);
    }

    #[test]
    fn test_saturated_timestamp_in_file_does_not_overflow() {
        let temp = NamedTempFile::new().unwrap();
        {
            let mut store = NoteStore::create(temp.path()).unwrap();
            store.save("from the far future").unwrap();
            store
                .connection()
                .execute("UPDATE notes SET updated_at = ?", [i64::MAX])
                .unwrap();
        }

        let mut store = NoteStore::open(temp.path()).unwrap();
        let note = store.save("today").unwrap();
        assert_eq!(note.created_at, i64::MAX);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_storage_failure_leaves_state_unchanged() {
        let (_temp, mut store) = new_store();
        let note = store.save("keep me").unwrap();
        store.connection().execute("DROP TABLE notes", []).unwrap();

        assert!(matches!(store.save("new"), Err(StackmateError::StorageUnavailable(_))));
        assert!(matches!(
            store.rename(&note.id, "renamed"),
            Err(StackmateError::StorageUnavailable(_))
        ));
        assert!(matches!(store.delete(&note.id), Err(StackmateError::StorageUnavailable(_))));

        assert_eq!(store.list(None), vec![note]);
    }

    #[test]
    fn test_row_deleted_elsewhere_surfaces_not_found() {
        let (_temp, mut store) = new_store();
        let note = store.save("shared").unwrap();
        store
            .connection()
            .execute("DELETE FROM notes WHERE id = ?", [&note.id])
            .unwrap();

        assert!(matches!(store.toggle_pin(&note.id), Err(StackmateError::NoteNotFound(_))));
        assert!(store.list(None).is_empty());
    }

    #[test]
    fn test_pin_delete_rename_scenario() {
        let (_temp, mut store) = new_store();
        let a = store.save("a").unwrap();
        let b = store.save("b").unwrap();

        store.toggle_pin(&a.id).unwrap();
        assert_eq!(contents(&store, None), vec!["a", "b"]);

        store.delete(&b.id).unwrap();
        assert_eq!(contents(&store, None), vec!["a"]);

        let renamed = store.rename(&a.id, "groceries").unwrap();
        assert_eq!(renamed.title, "groceries");
        assert_eq!(renamed.content, "a");
    }
}
