//! Query view state: input text, answer, sources, and the two UI flags.
//!
//! All mutation goes through `set_query`, `begin_submit`/`complete` and
//! `toggle_json_view`. Submissions may overlap; whichever completion is
//! applied last is what the view shows.

use std::fmt::Write as _;

use crate::client::{ClientError, QueryClient};
use crate::config::DEFAULT_DATE_FORMAT;
use crate::format::{self, UNKNOWN};
use crate::messages::{ContextItem, QueryResponse};

/// Shown in place of the answer when a request fails for any reason.
pub const ERROR_MESSAGE: &str = "Error occurred while fetching response";

pub const SUBMIT_LABEL: &str = "Submit";
pub const LOADING_LABEL: &str = "Loading...";
pub const SHOW_JSON_LABEL: &str = "Show JSON";
pub const SHOW_SUMMARY_LABEL: &str = "Show Summary";

/// Ticket for one in-flight submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    seq: u64,
    text: String,
}

impl PendingQuery {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone)]
pub struct QueryView {
    query: String,
    response: String,
    contexts: Vec<ContextItem>,
    loading: bool,
    show_json: bool,
    date_format: String,
    next_seq: u64,
}

impl Default for QueryView {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl QueryView {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            query: String::new(),
            response: String::new(),
            contexts: Vec::new(),
            loading: false,
            show_json: false,
            date_format: date_format.into(),
            next_seq: 0,
        }
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn contexts(&self) -> &[ContextItem] {
        &self.contexts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn show_json(&self) -> bool {
        self.show_json
    }

    pub fn submit_enabled(&self) -> bool {
        !self.loading
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            LOADING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Sources are shown only alongside a non-empty answer.
    pub fn has_sources(&self) -> bool {
        !self.response.is_empty() && !self.contexts.is_empty()
    }

    /// Label of the view toggle, or `None` while there is no sources section.
    pub fn toggle_label(&self) -> Option<&'static str> {
        if !self.has_sources() {
            return None;
        }
        Some(if self.show_json {
            SHOW_SUMMARY_LABEL
        } else {
            SHOW_JSON_LABEL
        })
    }

    pub fn toggle_json_view(&mut self) {
        self.show_json = !self.show_json;
    }

    /// Mark a submission of the current query text as in flight.
    pub fn begin_submit(&mut self) -> PendingQuery {
        self.loading = true;
        let seq = self.next_seq;
        self.next_seq += 1;
        PendingQuery {
            seq,
            text: self.query.clone(),
        }
    }

    /// Apply the outcome of `pending`. On failure the answer becomes
    /// [`ERROR_MESSAGE`], the previous sources stay, and the error is handed
    /// back to the caller.
    pub fn complete(
        &mut self,
        pending: PendingQuery,
        result: Result<QueryResponse, ClientError>,
    ) -> Result<(), ClientError> {
        self.loading = false;
        match result {
            Ok(reply) => {
                tracing::debug!(
                    seq = pending.seq,
                    contexts = reply.contexts.len(),
                    "query answered"
                );
                self.response = reply.response;
                self.contexts = reply.contexts;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(seq = pending.seq, error = %e, "query failed");
                self.response = ERROR_MESSAGE.to_string();
                Err(e)
            }
        }
    }

    /// Submit the current query text through `client` and apply the reply.
    pub async fn submit(&mut self, client: &QueryClient) -> Result<(), ClientError> {
        let pending = self.begin_submit();
        let result = client.query(pending.text()).await;
        self.complete(pending, result)
    }

    /// Answer plus sources section as plain text. Empty before the first answer.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.response.is_empty() {
            return out;
        }
        let _ = writeln!(out, "Response:");
        let _ = writeln!(out, "{}", self.response);
        if self.has_sources() {
            let _ = writeln!(out);
            out.push_str(&self.render_sources());
        }
        out
    }

    /// Sources heading plus either the JSON dump or one card per item.
    pub fn render_sources(&self) -> String {
        let mut out = String::new();
        let toggle = self.toggle_label().unwrap_or(SHOW_JSON_LABEL);
        let _ = writeln!(out, "Sources [{}]", toggle);
        if self.show_json {
            match serde_json::to_string_pretty(&self.contexts) {
                Ok(json) => {
                    let _ = writeln!(out, "{}", json);
                }
                Err(e) => tracing::warn!(error = %e, "failed to serialize contexts"),
            }
        } else {
            for ctx in &self.contexts {
                out.push_str(&self.render_card(ctx));
            }
        }
        out
    }

    fn render_card(&self, ctx: &ContextItem) -> String {
        let meta = &ctx.metadata;
        let score = ctx
            .score
            .map(|s| format!("{}%", format::relevance_percent(s)))
            .unwrap_or_else(|| "n/a".into());
        let file_type = meta
            .file_type
            .as_deref()
            .map(format::type_suffix)
            .unwrap_or(UNKNOWN);
        let size = meta
            .file_size
            .map(|b| format!("{} KB", format::kilobytes(b)))
            .unwrap_or_else(|| UNKNOWN.into());
        let modified = meta
            .last_modified_date
            .as_deref()
            .map(|d| format::display_date(d, &self.date_format))
            .unwrap_or_else(|| UNKNOWN.into());

        let mut card = String::new();
        let _ = writeln!(card, "- {} ({} relevant)", ctx.display_name(), score);
        let _ = writeln!(
            card,
            "  Type: {}  Size: {}  Modified: {}",
            file_type, size, modified
        );
        if let Some(preview) = ctx.text_preview.as_deref().filter(|p| !p.is_empty()) {
            let _ = writeln!(card, "  > {}", preview.replace('\n', " "));
        }
        card
    }
}
