//! RAG query client library (config, HTTP client, display formatting, query view).
//! Used by the `rag-query` terminal front end.

pub mod client;
pub mod config;
pub mod format;
pub mod messages;
pub mod view;

pub use client::{ClientError, QueryClient};
pub use config::{default_config_path, ApiSection, Config, ConfigError, DisplaySection};
pub use messages::{ContextItem, ContextMetadata, DocumentEntry, QueryResponse};
pub use view::{PendingQuery, QueryView, ERROR_MESSAGE};
