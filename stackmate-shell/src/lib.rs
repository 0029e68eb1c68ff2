pub mod cli;
pub mod locales;
pub mod settings;
pub mod tips;

// Re-export core library
pub use stackmate_core::*;

use serde::Serialize;
use settings::AppSettings;
use stackmate_core::services::{
    self, Answer, CleanupService, CleanupSuggestion, HttpServices, Question, QuestionSearch,
    SessionRecord, SessionStats, SessionStatus, SessionTimer, SummarySource, Summarizer,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tips::DevTips;

/// Everything the dashboard keeps between commands.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<NoteStore>>,
    pub composer: Arc<Mutex<NoteComposer>>,
    pub dashboard: Arc<Mutex<Dashboard>>,
    pub settings: Arc<Mutex<AppSettings>>,
    pub settings_path: PathBuf,
    pub tips: Arc<Mutex<DevTips>>,
    pub services: Option<Arc<HttpServices>>,
}

/// What the search box should show after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreview {
    pub live: TriggerQuery,
    pub suggestions: Vec<TriggerKind>,
    pub highlight: Vec<HighlightToken>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::result::Result<MutexGuard<'_, T>, String> {
    mutex.lock().map_err(|_| "Application state is unavailable".to_string())
}

impl AppState {
    /// Opens (or creates) the notes file named in `settings` and connects to
    /// the companion service. A service URL that cannot be used leaves the
    /// notes features working with services disabled.
    pub fn open(settings: AppSettings, settings_path: PathBuf) -> std::result::Result<Self, String> {
        let store = NoteStore::open_or_create(&settings.store_path).map_err(|e| {
            log::error!("Failed to open notes file {}: {e}", settings.store_path);
            e.user_message()
        })?;
        log::info!("Opened notes file {} ({} notes)", settings.store_path, store.len());

        let services = match HttpServices::new(&settings.service_url) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                log::warn!("Companion service disabled: {e}");
                None
            }
        };

        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            composer: Arc::new(Mutex::new(NoteComposer::new())),
            dashboard: Arc::new(Mutex::new(Dashboard::new())),
            settings: Arc::new(Mutex::new(settings)),
            settings_path,
            tips: Arc::new(Mutex::new(DevTips::new())),
            services,
        })
    }

    fn language(&self) -> String {
        lock(&self.settings)
            .map(|s| s.language.clone())
            .unwrap_or_else(|_| "english".to_string())
    }

    /// Error text for the UI, in the configured language where a
    /// translation exists.
    fn message(&self, e: StackmateError) -> String {
        if e.is_recoverable() {
            log::warn!("{e}");
        } else {
            log::error!("{e}");
        }
        match e {
            StackmateError::EmptyContent => locales::t(&self.language(), "cannotSaveEmpty"),
            other => other.user_message(),
        }
    }

    fn services(&self) -> std::result::Result<&HttpServices, String> {
        self.services
            .as_deref()
            .ok_or_else(|| "Companion service is not configured".to_string())
    }
}

/// Looks up a UI string in the configured language.
pub fn translate(state: &AppState, key: &str) -> String {
    locales::t(&state.language(), key)
}

// ── Search box ──────────────────────────────────────────────────

pub fn search_input(state: &AppState, text: &str) -> std::result::Result<SearchPreview, String> {
    let mut dashboard = lock(&state.dashboard)?;
    dashboard.on_input(text);
    Ok(SearchPreview {
        live: dashboard.live().clone(),
        suggestions: dashboard.suggestions(),
        highlight: trigger::highlight_tokens(text),
    })
}

/// Completes the search box with `kind` and returns the new text.
pub fn pick_suggestion(state: &AppState, kind: TriggerKind) -> std::result::Result<String, String> {
    let mut dashboard = lock(&state.dashboard)?;
    dashboard.select_suggestion(kind);
    Ok(dashboard.search_text().to_string())
}

/// Submits the current search text. `None` means the dashboard stayed put.
pub fn submit_search(state: &AppState) -> std::result::Result<Option<Dispatch>, String> {
    let mut dashboard = lock(&state.dashboard)?;
    Ok(dashboard.submit().and_then(|_| dashboard.committed().cloned()))
}

pub fn open_tool(state: &AppState, view: ViewId) -> std::result::Result<(), String> {
    lock(&state.dashboard)?.open_tool(view);
    Ok(())
}

pub fn back_to_dashboard(state: &AppState) -> std::result::Result<(), String> {
    lock(&state.dashboard)?.back_to_dashboard();
    Ok(())
}

pub fn active_view(state: &AppState) -> std::result::Result<ViewId, String> {
    Ok(lock(&state.dashboard)?.active_view())
}

// ── Notes ───────────────────────────────────────────────────────

/// Notes in display order. Without an explicit `filter`, the query forwarded
/// by the last `@notes` search applies.
pub fn list_notes(state: &AppState, filter: Option<&str>) -> std::result::Result<Vec<Note>, String> {
    let forwarded = match filter {
        Some(f) => f.to_string(),
        None => lock(&state.dashboard)?.query_for(ViewId::Notes).to_string(),
    };
    let store = lock(&state.store)?;
    Ok(store.list(Some(&forwarded)))
}

pub fn set_draft(state: &AppState, text: &str) -> std::result::Result<(), String> {
    lock(&state.composer)?.set_draft(text);
    Ok(())
}

pub fn clear_draft(state: &AppState) -> std::result::Result<(), String> {
    lock(&state.composer)?.clear_draft();
    Ok(())
}

/// Saves the current draft as a new note.
pub fn save_draft(state: &AppState) -> std::result::Result<Note, String> {
    let mut composer = lock(&state.composer)?;
    let mut store = lock(&state.store)?;
    composer.submit(&mut store).map_err(|e| state.message(e))
}

/// Sets the draft to `content` and saves it in one step.
pub fn add_note(state: &AppState, content: &str) -> std::result::Result<Note, String> {
    set_draft(state, content)?;
    save_draft(state)
}

pub fn rename_note(state: &AppState, note_id: &str, title: &str) -> std::result::Result<Note, String> {
    lock(&state.store)?
        .rename(note_id, title)
        .map_err(|e| state.message(e))
}

pub fn edit_note(state: &AppState, note_id: &str, content: &str) -> std::result::Result<Note, String> {
    lock(&state.store)?
        .edit_content(note_id, content)
        .map_err(|e| state.message(e))
}

pub fn toggle_pin(state: &AppState, note_id: &str) -> std::result::Result<Note, String> {
    lock(&state.store)?
        .toggle_pin(note_id)
        .map_err(|e| state.message(e))
}

pub fn delete_note(state: &AppState, note_id: &str) -> std::result::Result<(), String> {
    lock(&state.store)?
        .delete(note_id)
        .map_err(|e| state.message(e))
}

// ── Settings ────────────────────────────────────────────────────

pub fn get_settings(state: &AppState) -> std::result::Result<AppSettings, String> {
    Ok(lock(&state.settings)?.clone())
}

/// Picks up language and theme changes from the settings file. The open
/// notes file and service connection stay as they are until the next start.
pub fn reload_settings(state: &AppState) -> std::result::Result<AppSettings, String> {
    let saved = settings::load_settings_from(&state.settings_path);
    let mut current = lock(&state.settings)?;
    current.language = saved.language;
    current.dark_mode = saved.dark_mode;
    Ok(current.clone())
}

pub fn next_tip(state: &AppState) -> std::result::Result<&'static str, String> {
    Ok(lock(&state.tips)?.next_tip())
}

// ── Companion service ───────────────────────────────────────────

pub fn cleanup_scan(state: &AppState, path: &str) -> std::result::Result<Vec<CleanupSuggestion>, String> {
    state
        .services()?
        .suggestions(path)
        .map_err(|e| state.message(e))
}

pub fn cleanup_delete(state: &AppState, paths: &[String]) -> std::result::Result<Vec<String>, String> {
    let deleted = state
        .services()?
        .delete(paths)
        .map_err(|e| state.message(e))?;
    log::info!("Cleanup deleted {} of {} paths", deleted.len(), paths.len());
    Ok(deleted)
}

pub fn timer_start(state: &AppState) -> std::result::Result<String, String> {
    state.services()?.start().map_err(|e| state.message(e))
}

pub fn timer_stop(state: &AppState) -> std::result::Result<(), String> {
    state.services()?.stop().map_err(|e| state.message(e))
}

pub fn timer_status(state: &AppState) -> std::result::Result<SessionStatus, String> {
    state.services()?.status().map_err(|e| state.message(e))
}

pub fn timer_history(state: &AppState) -> std::result::Result<Vec<SessionRecord>, String> {
    state.services()?.history().map_err(|e| state.message(e))
}

pub fn timer_stats(state: &AppState) -> std::result::Result<SessionStats, String> {
    state.services()?.stats().map_err(|e| state.message(e))
}

pub fn summarize(state: &AppState, text: &str) -> std::result::Result<String, String> {
    if text.trim().is_empty() {
        return Err("Nothing to summarize".to_string());
    }
    state
        .services()?
        .summarize(text)
        .map_err(|e| state.message(e))
}

pub fn search_questions(state: &AppState, query: &str) -> std::result::Result<Vec<Question>, String> {
    state.services()?.search(query).map_err(|e| state.message(e))
}

/// A question with its body plus its answers, highest voted first.
pub fn question_detail(
    state: &AppState,
    question_id: u64,
) -> std::result::Result<(Question, Vec<Answer>), String> {
    let client = state.services()?;
    let question = client.question(question_id).map_err(|e| state.message(e))?;
    let answers = client.answers(question_id).map_err(|e| state.message(e))?;
    Ok((question, answers))
}

/// Summarizes the accepted (or top-voted) answer of `question_id`.
pub fn summarize_question(
    state: &AppState,
    question_id: u64,
) -> std::result::Result<Option<(SummarySource, String)>, String> {
    let client = state.services()?;
    let answers = client.answers(question_id).map_err(|e| state.message(e))?;
    services::summarize_best_answer(&answers, client).map_err(|e| state.message(e))
}
