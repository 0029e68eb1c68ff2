//! Command-line front end for the dashboard.
//!
//! Every subcommand maps onto one or two of the command functions in the
//! crate root, then prints the result for a terminal.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use log::debug;

use crate::settings::{self, AppSettings};
use crate::{locales, AppState, Dispatch, Note, ViewId};
use stackmate_core::services::{self, Answer, CleanupSuggestion, EntryKind, Question, SummarySource};

/// Characters of a note id shown in listings.
const SHORT_ID_LEN: usize = 8;

/// Developer dashboard: local notes, `@trigger` search and companion tools
#[derive(Parser, Debug)]
#[command(name = "stackmate", version, about)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Notes file to use instead of the configured one
    #[arg(long, value_parser)]
    pub store: Option<PathBuf>,

    /// Companion service URL to use instead of the configured one
    #[arg(long)]
    pub service_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route search text through the trigger router and show the destination
    Search {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show which words of the text are triggers
    Highlight {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Complete a partial trigger with the first suggestion
        #[arg(long)]
        complete: bool,
    },
    /// Manage saved notes
    #[command(subcommand)]
    Note(NoteCommand),
    /// Coding session timer
    #[command(subcommand)]
    Timer(TimerCommand),
    /// Find and delete clutter in a folder
    #[command(subcommand)]
    Cleanup(CleanupCommand),
    /// Summarize a piece of text
    Summarize {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// StackOverflow search
    #[command(subcommand)]
    So(SoCommand),
    /// Show a developer tip
    Tip,
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Save a new note
    Add {
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// List notes, pinned first
    List {
        /// Only notes whose content or title contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rename a note; no title restores the derived one
    Rename {
        id: String,
        title: Vec<String>,
    },
    /// Replace a note's content
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Pin or unpin a note
    Pin { id: String },
    /// Delete a note
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TimerCommand {
    Start,
    Stop,
    Status,
    /// Past sessions
    History {
        /// Hours per weekday instead of the session list
        #[arg(long)]
        weekly: bool,
    },
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum CleanupCommand {
    /// List deletable files and folders under a path
    Scan { path: String },
    /// Delete the given paths
    Delete {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SoCommand {
    /// Search question titles
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show a question's body and its answers, highest voted first
    Show { question_id: u64 },
    /// Summarize the accepted (or top-voted) answer of a question
    Summarize { question_id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Set one setting: language, darkMode, serviceUrl or storePath
    Set { key: String, value: String },
    /// Switch between light and dark
    Theme,
    /// List selectable interface languages
    Languages,
}

/// Loads settings, opens the app state and runs `cli.command`.
pub fn run(cli: Cli) -> Result<(), String> {
    let settings_path = cli.config.clone().unwrap_or_else(settings::settings_file_path);
    debug!("Using settings from {}", settings_path.display());

    let mut app_settings = settings::load_settings_from(&settings_path);
    apply_overrides(&mut app_settings, &cli);

    // Settings commands work on the file alone; the notes file stays closed.
    match cli.command {
        Commands::Settings(cmd) => run_settings(cmd, &settings_path),
        command => {
            let state = AppState::open(app_settings, settings_path)?;
            execute(&state, command)
        }
    }
}

fn apply_overrides(app_settings: &mut AppSettings, cli: &Cli) {
    if let Some(store) = &cli.store {
        app_settings.store_path = store.to_string_lossy().to_string();
    }
    if let Some(url) = &cli.service_url {
        app_settings.service_url = url.trim_end_matches('/').to_string();
    }
}

pub fn execute(state: &AppState, command: Commands) -> Result<(), String> {
    let tr = |key: &str| crate::translate(state, key);

    match command {
        Commands::Search { text } => {
            crate::search_input(state, &text.join(" "))?;
            match crate::submit_search(state)? {
                Some(dispatch) => render_destination(state, &dispatch)?,
                None => println!("{}", tr("dashboardSearchPlaceholder")),
            }
        }

        Commands::Highlight { text, complete } => {
            let preview = crate::search_input(state, &text.join(" "))?;
            let rendered: String = preview
                .highlight
                .iter()
                .map(|t| {
                    if t.is_trigger {
                        format!("[{}]", t.text)
                    } else {
                        t.text.clone()
                    }
                })
                .collect();
            println!("{rendered}");
            for kind in &preview.suggestions {
                println!("  suggestion: @{}", kind.keyword());
            }
            if let (true, Some(first)) = (complete, preview.suggestions.first()) {
                println!("{}", crate::pick_suggestion(state, *first)?);
            }
        }

        Commands::Note(cmd) => run_note(state, cmd, &tr)?,

        Commands::Timer(cmd) => run_timer(state, cmd, &tr)?,

        Commands::Cleanup(CleanupCommand::Scan { path }) => {
            let suggestions = crate::cleanup_scan(state, &path)?;
            print_suggestions(&suggestions, &tr);
        }

        Commands::Cleanup(CleanupCommand::Delete { paths }) => {
            let deleted = crate::cleanup_delete(state, &paths)?;
            for path in &deleted {
                println!("deleted {path}");
            }
            if deleted.len() < paths.len() {
                println!("{} of {} paths could not be deleted", paths.len() - deleted.len(), paths.len());
            }
        }

        Commands::Summarize { text } => {
            println!("{}: {}", tr("summary"), crate::summarize(state, &text.join(" "))?);
        }

        Commands::So(SoCommand::Search { query }) => {
            let questions = crate::search_questions(state, &query.join(" "))?;
            print_questions(&questions, &tr);
        }

        Commands::So(SoCommand::Show { question_id }) => {
            let (question, answers) = crate::question_detail(state, question_id)?;
            print_question(&question, &answers, &tr);
        }

        Commands::So(SoCommand::Summarize { question_id }) => {
            match crate::summarize_question(state, question_id)? {
                Some((source, summary)) => {
                    let from = match source {
                        SummarySource::Accepted => "accepted answer",
                        SummarySource::Fallback => "top-voted answer",
                    };
                    println!("{} ({from}): {summary}", tr("summary"));
                }
                None => println!("{}", tr("noResults")),
            }
        }

        Commands::Tip => println!("{}", crate::next_tip(state)?),

        Commands::Settings(cmd) => {
            run_settings(cmd, &state.settings_path)?;
            crate::reload_settings(state)?;
        }
    }

    Ok(())
}

/// Runs a settings command against the file at `path`.
pub fn run_settings(cmd: SettingsCommand, path: &Path) -> Result<(), String> {
    match cmd {
        SettingsCommand::Show => {
            let current = settings::load_settings_from(path);
            let json = serde_json::to_string_pretty(&current)
                .map_err(|e| format!("Failed to render settings: {e}"))?;
            println!("{json}");
        }
        SettingsCommand::Set { key, value } => {
            let saved = settings::update_settings_file(path, |s| s.set(&key, &value))?;
            match locales::native_name(&saved.language) {
                Some(name) if key == "language" => println!("language = {} ({name})", saved.language),
                _ => println!("{key} = {value}"),
            }
        }
        SettingsCommand::Theme => {
            let saved = settings::update_settings_file(path, |s| {
                s.toggle_theme();
                Ok(())
            })?;
            println!("theme: {:?}", saved.theme());
        }
        SettingsCommand::Languages => {
            let current = settings::load_settings_from(path).language;
            for (code, name) in locales::LANGUAGES {
                let mark = if code == current { "*" } else { " " };
                println!("{mark} {code:<12} {name}");
            }
        }
    }
    Ok(())
}

fn render_destination(state: &AppState, dispatch: &Dispatch) -> Result<(), String> {
    let tr = |key: &str| crate::translate(state, key);

    match dispatch.view {
        ViewId::Notes => {
            println!("== {} ==", tr("notes"));
            print_notes(&crate::list_notes(state, None)?, &tr);
        }
        ViewId::StackOverflow => {
            println!("== {} ==", tr("stackOverflow"));
            if services::is_searchable(&dispatch.query) {
                print_questions(&crate::search_questions(state, &dispatch.query)?, &tr);
            }
        }
        view => {
            let heading = match view {
                ViewId::JsonValidator => tr("jsonValidator"),
                ViewId::Plugins => tr("pluginManager"),
                ViewId::Cleanup => tr("cleanupTool"),
                ViewId::Stats => tr("codingStats"),
                _ => tr("title"),
            };
            println!("== {heading} ==");
            if !dispatch.query.is_empty() {
                println!("{}", dispatch.query);
            }
        }
    }
    Ok(())
}

fn run_note(state: &AppState, cmd: NoteCommand, tr: &dyn Fn(&str) -> String) -> Result<(), String> {
    match cmd {
        NoteCommand::Add { content } => {
            let note = crate::add_note(state, &content.join(" "))?;
            println!("{} {}", tr("noteSaved"), short_id(&note.id));
        }
        NoteCommand::List { filter, json } => {
            let notes = crate::list_notes(state, Some(filter.as_deref().unwrap_or("")))?;
            if json {
                let out = serde_json::to_string_pretty(&notes)
                    .map_err(|e| format!("Failed to render notes: {e}"))?;
                println!("{out}");
            } else {
                print_notes(&notes, tr);
            }
        }
        NoteCommand::Rename { id, title } => {
            let id = resolve_id(state, &id)?;
            let note = crate::rename_note(state, &id, &title.join(" "))?;
            println!("{}: {}", tr("noteRenamed"), note.title);
        }
        NoteCommand::Edit { id, content } => {
            let id = resolve_id(state, &id)?;
            crate::edit_note(state, &id, &content.join(" "))?;
            println!("{}", tr("noteUpdated"));
        }
        NoteCommand::Pin { id } => {
            let id = resolve_id(state, &id)?;
            let note = crate::toggle_pin(state, &id)?;
            let verb = if note.pinned { "pinned" } else { "unpinned" };
            println!("{verb} {}", note.title);
        }
        NoteCommand::Delete { id } => {
            let id = resolve_id(state, &id)?;
            crate::delete_note(state, &id)?;
            println!("{}", tr("noteDeleted"));
        }
    }
    Ok(())
}

fn run_timer(state: &AppState, cmd: TimerCommand, tr: &dyn Fn(&str) -> String) -> Result<(), String> {
    match cmd {
        TimerCommand::Start => {
            let started = crate::timer_start(state)?;
            println!("{} {started}", tr("activeSession"));
        }
        TimerCommand::Stop => {
            crate::timer_stop(state)?;
            println!("{}", tr("stopSession"));
        }
        TimerCommand::Status => {
            let status = crate::timer_status(state)?;
            match (status.active, status.start_time) {
                (true, Some(start)) => println!("{} {start}", tr("activeSession")),
                (true, None) => println!("{}", tr("activeSession")),
                (false, _) => println!("{}", tr("noSessions")),
            }
        }
        TimerCommand::History { weekly } => {
            let sessions = crate::timer_history(state)?;
            if weekly {
                println!("{}", tr("weeklyChart"));
                for (day, hours) in services::weekly_hours(&sessions) {
                    println!("  {day}  {hours:>6.2} h");
                }
            } else if sessions.is_empty() {
                println!("{}", tr("noSessions"));
            } else {
                for s in sessions {
                    println!(
                        "{}  ->  {}  {}",
                        s.start_time,
                        s.end_time.as_deref().unwrap_or("(running)"),
                        s.duration
                    );
                }
            }
        }
        TimerCommand::Stats => {
            let stats = crate::timer_stats(state)?;
            let total = stats
                .total_seconds()
                .map(services::format_duration)
                .unwrap_or(stats.total_time);
            println!("{}: {total}", tr("totalTime"));
            println!("{}: {}", tr("totalSessions"), stats.total_sessions);
        }
    }
    Ok(())
}

/// Expands a unique id prefix to the full note id.
fn resolve_id(state: &AppState, prefix: &str) -> Result<String, String> {
    let notes = crate::list_notes(state, Some(""))?;
    let mut matches = notes.iter().filter(|n| n.id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note.id.clone()),
        (Some(_), Some(_)) => Err(format!("Note id {prefix} is ambiguous")),
        (None, _) => Err(format!("No note with id {prefix}")),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn format_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn print_notes(notes: &[Note], tr: &dyn Fn(&str) -> String) {
    if notes.is_empty() {
        println!("{}", tr("noNotes"));
        return;
    }
    for note in notes {
        let pin = if note.pinned { "*" } else { " " };
        println!(
            "{pin} {}  {}  {}",
            short_id(&note.id),
            format_millis(note.updated_at),
            note.title
        );
    }
}

fn print_questions(questions: &[Question], tr: &dyn Fn(&str) -> String) {
    if questions.is_empty() {
        println!("{}", tr("noResults"));
        return;
    }
    for q in questions {
        let answered = if q.is_answered { "✓" } else { " " };
        println!(
            "{answered} {:>5} {}  [{}] {}",
            q.score,
            tr("votes"),
            q.question_id,
            q.title
        );
    }
}

fn print_question(question: &Question, answers: &[Answer], tr: &dyn Fn(&str) -> String) {
    println!("{}  ({} {})", question.title, question.score, tr("votes"));
    if let Some(link) = &question.link {
        println!("{link}");
    }
    if let Some(body) = &question.body {
        println!("\n{}", body.trim());
    }
    for answer in answers {
        let accepted = if answer.is_accepted { " ✓" } else { "" };
        println!("\n-- {} {}{accepted} --", answer.score, tr("votes"));
        println!("{}", answer.body.trim());
    }
}

fn print_suggestions(suggestions: &[CleanupSuggestion], tr: &dyn Fn(&str) -> String) {
    if suggestions.is_empty() {
        println!("{}", tr("noSuggestions"));
        return;
    }
    println!("{}", tr("cleanupHeading"));
    for s in suggestions {
        let marker = match s.kind {
            EntryKind::Folder => "dir ",
            EntryKind::File => "file",
        };
        println!("  {marker}  {}  ({})", s.name, s.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stackmate").chain(args.iter().copied())).unwrap()
    }

    fn state_in(dir: &TempDir) -> AppState {
        let app_settings = AppSettings {
            store_path: dir.path().join("notes.db").to_string_lossy().to_string(),
            service_url: "http://127.0.0.1:9".to_string(),
            ..AppSettings::default()
        };
        AppState::open(app_settings, dir.path().join("settings.json")).unwrap()
    }

    #[test]
    fn parses_note_add() {
        let parsed = cli(&["note", "add", "buy", "milk"]);
        match parsed.command {
            Commands::Note(NoteCommand::Add { content }) => assert_eq!(content.join(" "), "buy milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_overrides() {
        let parsed = cli(&["--store", "/tmp/n.db", "--service-url", "http://h:1/", "-v", "tip"]);
        assert!(parsed.verbose);
        let mut app_settings = AppSettings::default();
        apply_overrides(&mut app_settings, &parsed);
        assert_eq!(app_settings.store_path, "/tmp/n.db");
        assert_eq!(app_settings.service_url, "http://h:1");
    }

    #[test]
    fn search_requires_text() {
        assert!(Cli::try_parse_from(["stackmate", "search"]).is_err());
    }

    #[test]
    fn note_commands_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);

        execute(&state, cli(&["note", "add", "buy", "milk"]).command).unwrap();
        let id = crate::list_notes(&state, Some("")).unwrap()[0].id.clone();

        execute(&state, cli(&["note", "pin", short_id(&id)]).command).unwrap();
        execute(&state, cli(&["note", "rename", &id, "Groceries"]).command).unwrap();
        execute(&state, cli(&["note", "list", "--json"]).command).unwrap();

        let note = &crate::list_notes(&state, Some("")).unwrap()[0];
        assert!(note.pinned);
        assert_eq!(note.title, "Groceries");

        execute(&state, cli(&["note", "delete", &id]).command).unwrap();
        assert!(execute(&state, cli(&["note", "delete", &id]).command).is_err());
    }

    #[test]
    fn blank_note_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let err = execute(&state, cli(&["note", "add", " "]).command).unwrap_err();
        assert_eq!(err, "Cannot save an empty note!");
    }

    #[test]
    fn search_renders_notes_view() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        crate::add_note(&state, "buy milk").unwrap();

        execute(&state, cli(&["search", "@notes", "milk"]).command).unwrap();
        assert_eq!(crate::active_view(&state).unwrap(), ViewId::Notes);

        execute(&state, cli(&["search", "@github", "rust-lang"]).command).unwrap();
        assert_eq!(crate::active_view(&state).unwrap(), ViewId::Plugins);
    }

    #[test]
    fn resolve_id_rejects_unknown_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        crate::add_note(&state, "one").unwrap();
        assert_eq!(resolve_id(&state, "zzzz").unwrap_err(), "No note with id zzzz");
        assert!(resolve_id(&state, "").is_ok());
    }

    #[test]
    fn settings_commands_persist() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        execute(&state, cli(&["settings", "set", "language", "german"]).command).unwrap();
        execute(&state, cli(&["settings", "theme"]).command).unwrap();

        let saved = settings::load_settings_from(&dir.path().join("settings.json"));
        assert_eq!(saved.language, "german");
        assert!(saved.dark_mode);
        assert_eq!(crate::get_settings(&state).unwrap().language, "german");
        assert_eq!(crate::translate(&state, "saveButton"), "Speichern");
    }

    #[test]
    fn settings_commands_leave_the_notes_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        let store = dir.path().join("notes.db");
        settings::save_settings_to(
            &config,
            &AppSettings {
                store_path: store.to_string_lossy().to_string(),
                ..AppSettings::default()
            },
        )
        .unwrap();

        let config_arg = config.to_str().unwrap();
        for args in [
            vec!["stackmate", "--config", config_arg, "settings", "show"],
            vec!["stackmate", "--config", config_arg, "settings", "languages"],
            vec!["stackmate", "--config", config_arg, "settings", "set", "language", "hindi"],
            vec!["stackmate", "--config", config_arg, "settings", "theme"],
        ] {
            run(Cli::try_parse_from(args).unwrap()).unwrap();
        }

        assert!(!store.exists());
        let saved = settings::load_settings_from(&config);
        assert_eq!(saved.language, "hindi");
        assert!(saved.dark_mode);
    }

    #[test]
    fn settings_store_override_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        let args = [
            "stackmate",
            "--config",
            config.to_str().unwrap(),
            "--store",
            "/tmp/override.db",
            "settings",
            "theme",
        ];
        run(Cli::try_parse_from(args).unwrap()).unwrap();
        assert_ne!(settings::load_settings_from(&config).store_path, "/tmp/override.db");
    }

    #[test]
    fn invalid_setting_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let cmd = SettingsCommand::Set {
            key: "language".to_string(),
            value: "klingon".to_string(),
        };
        assert_eq!(run_settings(cmd, &path).unwrap_err(), "Unsupported language: klingon");
        assert!(!path.exists());
    }

    #[test]
    fn parses_so_show() {
        match cli(&["so", "show", "42"]).command {
            Commands::So(SoCommand::Show { question_id }) => assert_eq!(question_id, 42),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["stackmate", "so", "show", "abc"]).is_err());
    }

    #[test]
    fn so_show_surfaces_unreachable_service() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        state.services = Some(std::sync::Arc::new(
            services::HttpServices::with_timeout("http://127.0.0.1:9", std::time::Duration::from_secs(2))
                .unwrap()
                .with_stack_exchange_url("http://127.0.0.1:9"),
        ));
        assert!(execute(&state, cli(&["so", "show", "42"]).command).is_err());
    }

    #[test]
    fn highlight_complete_fills_in_the_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        execute(&state, cli(&["highlight", "--complete", "@no"]).command).unwrap();
        assert_eq!(state.dashboard.lock().unwrap().search_text(), "@notes ");

        execute(&state, cli(&["highlight", "--complete", "plain words"]).command).unwrap();
        assert_eq!(state.dashboard.lock().unwrap().search_text(), "plain words");
    }

    #[test]
    fn run_uses_config_and_store_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        let store = dir.path().join("elsewhere.db");
        let args = [
            "stackmate",
            "--config",
            config.to_str().unwrap(),
            "--store",
            store.to_str().unwrap(),
            "note",
            "add",
            "hello",
        ];
        run(Cli::try_parse_from(args).unwrap()).unwrap();
        assert!(store.exists());
        assert!(!config.exists());
    }
}
