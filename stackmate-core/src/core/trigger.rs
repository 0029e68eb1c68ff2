//! The `@trigger` query language of the dashboard search box.
//!
//! Search text of the form `@keyword rest` names a destination view and a
//! residual query forwarded to that view's own filter. Everything here is a
//! pure function of its input: unrecognised text is a valid "no trigger"
//! outcome, never an error.
//!
//! ```rust
//! use stackmate_core::trigger::{parse, resolve_target, TriggerKind, ViewId};
//!
//! let q = parse("@notes milk");
//! assert_eq!(q.trigger, Some(TriggerKind::Notes));
//! assert_eq!(q.residual_query, "milk");
//! assert_eq!(resolve_target(TriggerKind::Github), ViewId::Plugins);
//! ```

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// The one-character sentinel that starts a trigger.
pub const MARKER: char = '@';

/// Marker, word token, at least one whitespace, then the rest of a single line.
static TRIGGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z0-9_]+)\s+(.*)$").expect("valid regex"));

/// Any marker-prefixed word, for highlighting.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid regex"));

/// The fixed set of recognised trigger keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Stack,
    Json,
    Notes,
    Plugins,
    Github,
    Eslint,
    Test,
}

impl TriggerKind {
    /// Every trigger, in the order the suggestion list shows them.
    pub const ALL: [TriggerKind; 7] = [
        TriggerKind::Stack,
        TriggerKind::Json,
        TriggerKind::Notes,
        TriggerKind::Plugins,
        TriggerKind::Github,
        TriggerKind::Eslint,
        TriggerKind::Test,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TriggerKind::Stack => "stack",
            TriggerKind::Json => "json",
            TriggerKind::Notes => "notes",
            TriggerKind::Plugins => "plugins",
            TriggerKind::Github => "github",
            TriggerKind::Eslint => "eslint",
            TriggerKind::Test => "test",
        }
    }

    /// Case-insensitive keyword lookup, without the marker.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.keyword() == word)
    }
}

/// Destination views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    Dashboard,
    Notes,
    JsonValidator,
    #[serde(rename = "stackoverflow")]
    StackOverflow,
    Cleanup,
    Stats,
    Plugins,
}

impl ViewId {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Dashboard => "dashboard",
            ViewId::Notes => "notes",
            ViewId::JsonValidator => "json-validator",
            ViewId::StackOverflow => "stackoverflow",
            ViewId::Cleanup => "cleanup",
            ViewId::Stats => "stats",
            ViewId::Plugins => "plugins",
        }
    }
}

/// Result of parsing search-box text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerQuery {
    pub trigger: Option<TriggerKind>,
    pub residual_query: String,
}

/// A run of display text, flagged when it is a marker-prefixed word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightToken {
    pub text: String,
    pub is_trigger: bool,
}

/// A committed navigation intent produced on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispatch {
    pub view: ViewId,
    pub trigger: Option<TriggerKind>,
    /// Text forwarded to the destination view's own filter or query input.
    pub query: String,
}

/// Parses `input` into a trigger and the residual query after it.
///
/// Input that does not have the shape `@word<whitespace>rest`, or whose word
/// is not a known trigger, yields `{ trigger: None, residual_query: "" }`.
pub fn parse(input: &str) -> TriggerQuery {
    let Some(caps) = TRIGGER_RE.captures(input) else {
        return TriggerQuery::default();
    };
    match TriggerKind::from_keyword(&caps[1]) {
        Some(kind) => TriggerQuery {
            trigger: Some(kind),
            residual_query: caps[2].trim().to_string(),
        },
        None => {
            debug!("Ignoring unknown trigger '@{}'", &caps[1]);
            TriggerQuery::default()
        }
    }
}

/// True while the user is still typing a trigger: the text starts with the
/// marker but no trigger has been recognised yet.
pub fn should_suggest(input: &str) -> bool {
    input.starts_with(MARKER) && parse(input).trigger.is_none()
}

/// Triggers to offer while [`should_suggest`] holds, narrowed by the partial
/// keyword typed so far. Falls back to the full list when nothing matches.
pub fn suggestions(input: &str) -> Vec<TriggerKind> {
    if !should_suggest(input) {
        return Vec::new();
    }
    let typed = input[MARKER.len_utf8()..]
        .split(char::is_whitespace)
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    let matching: Vec<TriggerKind> = TriggerKind::ALL
        .into_iter()
        .filter(|k| k.keyword().starts_with(&typed))
        .collect();

    if matching.is_empty() {
        TriggerKind::ALL.to_vec()
    } else {
        matching
    }
}

/// Search-box text after the user picks `kind` from the suggestion list.
pub fn apply_suggestion(kind: TriggerKind) -> String {
    format!("{MARKER}{} ", kind.keyword())
}

/// Maps a trigger to its destination view.
///
/// This mapping is many-to-one on purpose: `plugins`, `github`, `eslint` and
/// `test` all open the plugin manager, which has no per-keyword sub-views.
pub fn resolve_target(kind: TriggerKind) -> ViewId {
    match kind {
        TriggerKind::Stack => ViewId::StackOverflow,
        TriggerKind::Json => ViewId::JsonValidator,
        TriggerKind::Notes => ViewId::Notes,
        TriggerKind::Plugins | TriggerKind::Github | TriggerKind::Eslint | TriggerKind::Test => {
            ViewId::Plugins
        }
    }
}

/// Splits `text` into runs, tagging every `@word` run. Concatenating the
/// returned runs reproduces `text` exactly.
pub fn highlight_tokens(text: &str) -> Vec<HighlightToken> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in TOKEN_RE.find_iter(text) {
        if m.start() > last {
            tokens.push(HighlightToken {
                text: text[last..m.start()].to_string(),
                is_trigger: false,
            });
        }
        tokens.push(HighlightToken {
            text: m.as_str().to_string(),
            is_trigger: true,
        });
        last = m.end();
    }
    if last < text.len() {
        tokens.push(HighlightToken {
            text: text[last..].to_string(),
            is_trigger: false,
        });
    }
    tokens
}

/// Turns submitted search text into a navigation intent.
///
/// A recognised trigger routes to its view with the residual query. Blank
/// input does not navigate. Anything else routes to the notes view; plain
/// text is forwarded as the notes filter, while an unrecognised `@word`
/// forwards nothing.
pub fn dispatch(input: &str) -> Option<Dispatch> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = parse(input);
    let dispatch = match parsed.trigger {
        Some(kind) => Dispatch {
            view: resolve_target(kind),
            trigger: Some(kind),
            query: parsed.residual_query,
        },
        None => Dispatch {
            view: ViewId::Notes,
            trigger: None,
            query: if trimmed.starts_with(MARKER) {
                String::new()
            } else {
                trimmed.to_string()
            },
        },
    };
    debug!("Dispatching search to {}", dispatch.view.as_str());
    Some(dispatch)
}
