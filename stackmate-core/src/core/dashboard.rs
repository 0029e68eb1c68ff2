//! View-state of the dashboard: which tool is open and what the search box holds.

use crate::trigger::{self, Dispatch, TriggerKind, TriggerQuery, ViewId};
use log::debug;

/// Explicit navigation context for the dashboard.
///
/// Keystrokes only refresh the live parse and the suggestion flag; the
/// active view changes on [`submit`](Self::submit), a tool click, or going
/// back. The router functions in [`crate::trigger`] stay pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    active_view: ViewId,
    search_text: String,
    live: TriggerQuery,
    show_suggestions: bool,
    committed: Option<Dispatch>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            active_view: ViewId::Dashboard,
            search_text: String::new(),
            live: TriggerQuery::default(),
            show_suggestions: false,
            committed: None,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_view(&self) -> ViewId {
        self.active_view
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// The parse of the current search text, refreshed on every keystroke.
    pub fn live(&self) -> &TriggerQuery {
        &self.live
    }

    pub fn show_suggestions(&self) -> bool {
        self.show_suggestions
    }

    /// Triggers to list under the search box, empty when the list is hidden.
    pub fn suggestions(&self) -> Vec<TriggerKind> {
        if self.show_suggestions {
            trigger::suggestions(&self.search_text)
        } else {
            Vec::new()
        }
    }

    /// The last submitted navigation intent, if any.
    pub fn committed(&self) -> Option<&Dispatch> {
        self.committed.as_ref()
    }

    /// Records a keystroke. Does not navigate.
    pub fn on_input(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.live = trigger::parse(&self.search_text);
        self.show_suggestions = trigger::should_suggest(&self.search_text);
    }

    /// Replaces the search text with the picked trigger and hides the list.
    pub fn select_suggestion(&mut self, kind: TriggerKind) {
        self.on_input(trigger::apply_suggestion(kind));
        self.show_suggestions = false;
    }

    /// Commits the search text. Returns the new active view, or `None` when
    /// the text was blank and nothing changed.
    pub fn submit(&mut self) -> Option<ViewId> {
        self.show_suggestions = false;
        let dispatch = trigger::dispatch(&self.search_text)?;
        debug!(
            "Search submitted: view={} query={:?}",
            dispatch.view.as_str(),
            dispatch.query
        );
        self.active_view = dispatch.view;
        self.committed = Some(dispatch);
        Some(self.active_view)
    }

    /// Opens a tool directly from its dashboard card. No query is forwarded.
    pub fn open_tool(&mut self, view: ViewId) {
        self.active_view = view;
        self.committed = None;
        self.show_suggestions = false;
    }

    /// Returns to the dashboard and resets all search state.
    pub fn back_to_dashboard(&mut self) {
        *self = Self::default();
    }

    /// Query forwarded to `view`: the committed query when the last submit
    /// targeted `view` and it is still open, otherwise empty.
    pub fn query_for(&self, view: ViewId) -> &str {
        match &self.committed {
            Some(d) if d.view == view && self.active_view == view => &d.query,
            _ => "",
        }
    }
}
