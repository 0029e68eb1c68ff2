//! Contracts for the companion services behind the cleanup, stats and
//! StackOverflow tools.
//!
//! The services themselves are black boxes reached over HTTP (see
//! [`HttpServices`] with the `services` feature). Nothing in here touches the
//! note store or the router; a failed call only ever yields
//! [`StackmateError::Service`](crate::StackmateError::Service).

#[cfg(feature = "services")]
mod http;

#[cfg(feature = "services")]
pub use http::HttpServices;

use crate::Result;
use chrono::{DateTime, Datelike, Weekday};
use serde::{Deserialize, Serialize};

/// Default address of the local companion service.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5070";

/// Question searches shorter than this (in characters) are not sent.
pub const MIN_SEARCH_CHARS: usize = 3;

/// A file or folder the cleanup service considers safe to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSuggestion {
    #[serde(default)]
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    File,
    Folder,
}

/// Reply of `GET /session-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub active: bool,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// One finished coding session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Human-readable duration, `"H hr M min S sec"`.
    #[serde(default)]
    pub duration: String,
}

/// Reply of `GET /stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_time: String,
    pub total_sessions: u64,
}

impl SessionStats {
    /// Total tracked time in seconds, if `total_time` is well-formed.
    pub fn total_seconds(&self) -> Option<u64> {
        parse_duration(&self.total_time)
    }
}

/// A StackOverflow question as returned by the StackExchange API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: u64,
    pub title: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default)]
    pub body: Option<String>,
}

/// A StackOverflow answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer_id: u64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub body: String,
}

/// Which answer a summary was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Accepted,
    Fallback,
}

/// Scans folders for deletable clutter and deletes what the user confirms.
pub trait CleanupService {
    fn suggestions(&self, path: &str) -> Result<Vec<CleanupSuggestion>>;
    /// Deletes `paths` and returns the ones actually removed.
    fn delete(&self, paths: &[String]) -> Result<Vec<String>>;
}

/// Tracks coding sessions.
pub trait SessionTimer {
    /// Starts a session and returns its start time.
    fn start(&self) -> Result<String>;
    fn stop(&self) -> Result<()>;
    fn status(&self) -> Result<SessionStatus>;
    fn history(&self) -> Result<Vec<SessionRecord>>;
    fn stats(&self) -> Result<SessionStats>;
}

/// Condenses arbitrary text.
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String>;
}

/// Searches StackOverflow.
pub trait QuestionSearch {
    /// Questions whose title matches `query`, most relevant first. Queries
    /// shorter than [`MIN_SEARCH_CHARS`] return nothing.
    fn search(&self, query: &str) -> Result<Vec<Question>>;
    /// One question with its body.
    fn question(&self, question_id: u64) -> Result<Question>;
    /// Answers to `question_id`, highest voted first.
    fn answers(&self, question_id: u64) -> Result<Vec<Answer>>;
}

/// Whether `query` is long enough to be worth searching for.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SEARCH_CHARS
}

/// Picks the answer to summarize: the accepted one, else the first (top-voted).
pub fn pick_summary_source(answers: &[Answer]) -> Option<(&Answer, SummarySource)> {
    answers
        .iter()
        .find(|a| a.is_accepted)
        .map(|a| (a, SummarySource::Accepted))
        .or_else(|| answers.first().map(|a| (a, SummarySource::Fallback)))
}

/// Summarizes the best answer in `answers`, or returns `None` when there are none.
pub fn summarize_best_answer(
    answers: &[Answer],
    summarizer: &dyn Summarizer,
) -> Result<Option<(SummarySource, String)>> {
    match pick_summary_source(answers) {
        Some((answer, source)) => Ok(Some((source, summarizer.summarize(&answer.body)?))),
        None => Ok(None),
    }
}

/// Parses `"H hr M min S sec"` into seconds. Values that overflow give `None`.
pub fn parse_duration(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    match parts.as_slice() {
        [h, "hr", m, "min", s, "sec"] => {
            let h: u64 = h.parse().ok()?;
            let m: u64 = m.parse().ok()?;
            let s: u64 = s.parse().ok()?;
            h.checked_mul(3600)?
                .checked_add(m.checked_mul(60)?)?
                .checked_add(s)
        }
        _ => None,
    }
}

/// Formats seconds as `"Hh Mm Ss"`.
pub fn format_duration(seconds: u64) -> String {
    format!(
        "{}h {}m {}s",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Hours coded per weekday, Monday first. Sessions with an unreadable start
/// time or duration are skipped. Weekdays are taken in the start time's own
/// UTC offset.
pub fn weekly_hours(sessions: &[SessionRecord]) -> [(Weekday, f64); 7] {
    let mut hours = [
        (Weekday::Mon, 0.0),
        (Weekday::Tue, 0.0),
        (Weekday::Wed, 0.0),
        (Weekday::Thu, 0.0),
        (Weekday::Fri, 0.0),
        (Weekday::Sat, 0.0),
        (Weekday::Sun, 0.0),
    ];
    for session in sessions {
        let Ok(start) = DateTime::parse_from_rfc3339(&session.start_time) else {
            continue;
        };
        let Some(seconds) = parse_duration(&session.duration) else {
            continue;
        };
        let slot = start.weekday().num_days_from_monday() as usize;
        hours[slot].1 += seconds as f64 / 3600.0;
    }
    hours
}

/// Builds a user-facing message from a failed response: the payload's
/// `error` or `message` field when present, otherwise a generic line.
pub fn error_message(action: &str, status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("{action} failed (HTTP {status})"))
}
