use serde::{Deserialize, Serialize};

/// Longest derived title, in characters, before it is cut with an ellipsis.
pub const TITLE_MAX_CHARS: usize = 40;

/// A saved note. Field names serialize in camelCase to match the stored record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    pub title: String,
    pub pinned: bool,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
    /// Unix timestamp in milliseconds; bumped by content and title edits only.
    pub updated_at: i64,
}

impl Note {
    /// Case-insensitive substring match against content or title.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle) || self.title.to_lowercase().contains(needle)
    }
}

/// Derives a display title from note content: the first non-blank line,
/// trimmed and cut to [`TITLE_MAX_CHARS`].
pub fn derive_title(content: &str) -> String {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    if line.chars().count() <= TITLE_MAX_CHARS {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(TITLE_MAX_CHARS).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}
