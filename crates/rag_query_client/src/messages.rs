//! JSON types exchanged with the query service (`/api/query`, `/api/documents`,
//! `/api/reload`, `/api/upload`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Server → client: answer plus the chunks it was built from.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contexts: Vec<ContextItem>,
}

fn null_as_empty<'de, D>(d: D) -> Result<Vec<ContextItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ContextItem>>::deserialize(d)?.unwrap_or_default())
}

/// File metadata attached to a context item. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMetadata {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    /// Bytes.
    pub file_size: Option<f64>,
    pub last_modified_date: Option<String>,
}

/// One supporting source returned with an answer.
///
/// Keeps the JSON object it was decoded from so it serializes back exactly,
/// including fields this client does not know about.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextItem {
    pub score: Option<f64>,
    pub file_name: Option<String>,
    pub text_preview: Option<String>,
    pub metadata: ContextMetadata,
    raw: Value,
}

fn str_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

impl ContextItem {
    pub fn from_value(raw: Value) -> Result<Self, String> {
        let obj = raw
            .as_object()
            .ok_or_else(|| format!("context item must be an object, got {}", raw))?;

        let metadata = match obj.get("metadata") {
            Some(Value::Object(m)) => ContextMetadata {
                file_name: str_field(m, "file_name"),
                file_type: str_field(m, "file_type"),
                file_size: m.get("file_size").and_then(Value::as_f64),
                last_modified_date: str_field(m, "last_modified_date"),
            },
            _ => ContextMetadata::default(),
        };

        Ok(Self {
            score: obj.get("score").and_then(Value::as_f64),
            file_name: str_field(obj, "file_name"),
            text_preview: str_field(obj, "text_preview"),
            metadata,
            raw,
        })
    }

    /// Name shown on the summary card.
    pub fn display_name(&self) -> &str {
        self.metadata
            .file_name
            .as_deref()
            .or(self.file_name.as_deref())
            .unwrap_or("Unknown")
    }
}

impl<'de> Deserialize<'de> for ContextItem {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(d)?;
        ContextItem::from_value(raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ContextItem {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(s)
    }
}

/// Server → client: `GET /api/documents`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DocumentEntry {
    pub name: String,
    pub size: f64,
    /// Epoch seconds.
    pub last_modified: f64,
}

/// Server → client: acknowledgement from `/api/reload` and `/api/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

/// Server → client: error body sent with a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
