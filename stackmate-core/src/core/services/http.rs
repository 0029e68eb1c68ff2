//! Blocking HTTP client for the companion service and the StackExchange API.

use super::{
    error_message, is_searchable, Answer, CleanupService, CleanupSuggestion, Question,
    QuestionSearch, SessionRecord, SessionStats, SessionStatus, SessionTimer, Summarizer,
};
use crate::{Result, StackmateError};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const STACK_EXCHANGE_URL: &str = "https://api.stackexchange.com/2.3";

/// Results requested per StackExchange page.
const PAGE_SIZE: &str = "10";

#[derive(Deserialize)]
struct SuggestionsReply {
    suggestions: Vec<CleanupSuggestion>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    paths: &'a [String],
}

#[derive(Deserialize)]
struct DeleteReply {
    deleted: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartReply {
    start_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest<'a> {
    answer_text: &'a str,
}

#[derive(Deserialize)]
struct SummarizeReply {
    summary: String,
}

#[derive(Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

/// One client for every companion endpoint plus StackExchange search.
pub struct HttpServices {
    base_url: String,
    stack_exchange_url: String,
    client: Client,
}

impl HttpServices {
    /// Creates a client for the companion service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StackmateError::Service`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StackmateError::Service(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            stack_exchange_url: STACK_EXCHANGE_URL.to_string(),
            client,
        })
    }

    /// Points question search at a different StackExchange-compatible API root.
    pub fn with_stack_exchange_url(mut self, url: &str) -> Self {
        self.stack_exchange_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `request` and decodes a JSON reply, mapping every failure to
    /// [`StackmateError::Service`].
    fn fetch<T: DeserializeOwned>(&self, action: &str, request: RequestBuilder) -> Result<T> {
        let resp = request.send().map_err(|e| {
            warn!("{action} request failed: {e}");
            StackmateError::Service(format!("{action} failed: could not reach service"))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!("{action} returned HTTP {status}");
            return Err(StackmateError::Service(error_message(
                action,
                status.as_u16(),
                &body,
            )));
        }

        resp.json::<T>().map_err(|e| {
            warn!("{action} returned an unreadable body: {e}");
            StackmateError::Service(format!("{action} failed: unexpected response"))
        })
    }

    /// Like [`fetch`](Self::fetch) but ignores the body of a successful reply.
    fn send(&self, action: &str, request: RequestBuilder) -> Result<()> {
        let resp = request.send().map_err(|e| {
            warn!("{action} request failed: {e}");
            StackmateError::Service(format!("{action} failed: could not reach service"))
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(StackmateError::Service(error_message(
            action,
            status.as_u16(),
            &body,
        )))
    }
}

impl CleanupService for HttpServices {
    fn suggestions(&self, path: &str) -> Result<Vec<CleanupSuggestion>> {
        let path = path.trim();
        if path.is_empty() {
            return Err(StackmateError::Service("Please enter a folder path.".to_string()));
        }
        debug!("Requesting cleanup suggestions for {path}");
        let reply: SuggestionsReply = self.fetch(
            "Cleanup scan",
            self.client
                .get(self.url("/cleanup-suggestions"))
                .query(&[("path", path)]),
        )?;
        Ok(reply.suggestions)
    }

    fn delete(&self, paths: &[String]) -> Result<Vec<String>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let reply: DeleteReply = self.fetch(
            "Deletion",
            self.client
                .delete(self.url("/delete-temp"))
                .json(&DeleteRequest { paths }),
        )?;
        Ok(reply.deleted)
    }
}

impl SessionTimer for HttpServices {
    fn start(&self) -> Result<String> {
        let reply: StartReply = self.fetch("Start session", self.client.post(self.url("/start")))?;
        Ok(reply.start_time)
    }

    fn stop(&self) -> Result<()> {
        self.send("Stop session", self.client.post(self.url("/stop")))
    }

    fn status(&self) -> Result<SessionStatus> {
        self.fetch("Session status", self.client.get(self.url("/session-status")))
    }

    fn history(&self) -> Result<Vec<SessionRecord>> {
        self.fetch("Session history", self.client.get(self.url("/sessions")))
    }

    fn stats(&self) -> Result<SessionStats> {
        self.fetch("Stats", self.client.get(self.url("/stats")))
    }
}

impl Summarizer for HttpServices {
    fn summarize(&self, text: &str) -> Result<String> {
        let reply: SummarizeReply = self.fetch(
            "Summarize",
            self.client
                .post(self.url("/api/summarize"))
                .json(&SummarizeRequest { answer_text: text }),
        )?;
        Ok(reply.summary)
    }
}

impl QuestionSearch for HttpServices {
    fn search(&self, query: &str) -> Result<Vec<Question>> {
        if !is_searchable(query) {
            return Ok(Vec::new());
        }
        let reply: Items<Question> = self.fetch(
            "StackOverflow search",
            self.client
                .get(format!("{}/search", self.stack_exchange_url))
                .query(&[
                    ("order", "desc"),
                    ("sort", "relevance"),
                    ("intitle", query.trim()),
                    ("site", "stackoverflow"),
                    ("pagesize", PAGE_SIZE),
                ]),
        )?;
        Ok(reply.items)
    }

    fn question(&self, question_id: u64) -> Result<Question> {
        let reply: Items<Question> = self.fetch(
            "StackOverflow question",
            self.client
                .get(format!("{}/questions/{question_id}", self.stack_exchange_url))
                .query(&[("site", "stackoverflow"), ("filter", "withbody")]),
        )?;
        reply.items.into_iter().next().ok_or_else(|| {
            StackmateError::Service(format!("Question {question_id} was not found"))
        })
    }

    fn answers(&self, question_id: u64) -> Result<Vec<Answer>> {
        let reply: Items<Answer> = self.fetch(
            "StackOverflow answers",
            self.client
                .get(format!(
                    "{}/questions/{question_id}/answers",
                    self.stack_exchange_url
                ))
                .query(&[
                    ("order", "desc"),
                    ("sort", "votes"),
                    ("site", "stackoverflow"),
                    ("filter", "withbody"),
                    ("pagesize", PAGE_SIZE),
                ]),
        )?;
        Ok(reply.items)
    }
}
