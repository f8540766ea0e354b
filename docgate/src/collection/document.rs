use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

use crate::common::Value;
use crate::errors::{ErrorKind, GatewayError, GatewayResult};

/// Represents a single record in a collection: a unique key plus an opaque
/// payload.
///
/// The key is always a non-empty [String], unique within its collection and
/// immutable once the store has chosen it. The payload is an arbitrary
/// [Value] tree that the gateway never interprets.
///
/// On the wire a document is an object with a string identity field and an
/// opaque payload field:
///
/// ```text
/// {"_id": "user-1", "doc": {"name": "Alice", "age": 30}}
/// ```
///
/// Field paths used by filters always address the payload, never the key,
/// so a document's own key can never be accidentally matched as a payload
/// field.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    key: String,
    #[serde(rename = "doc")]
    body: Value,
}

impl Document {
    /// Creates a new document with the given key and payload.
    ///
    /// # Arguments
    ///
    /// * `key` - The document key. Must not be empty.
    /// * `body` - The opaque payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn new(key: impl Into<String>, body: Value) -> GatewayResult<Document> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support an empty key");
            return Err(GatewayError::new(
                "Document does not support an empty key",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(Document { key, body })
    }

    /// Builds a document from parts already validated by the store.
    pub(crate) fn from_parts(key: String, body: Value) -> Document {
        Document { key, body }
    }

    /// Decodes a document from its wire JSON form.
    ///
    /// # Errors
    ///
    /// Returns a decode failure if the text is not valid JSON for the wire
    /// shape, or if the decoded key is empty.
    pub fn from_wire_json(json: &str) -> GatewayResult<Document> {
        let document: Document = serde_json::from_str(json)?;
        if document.key.is_empty() {
            return Err(GatewayError::new(
                "Decoded document has an empty key",
                ErrorKind::DecodeFailure,
            ));
        }
        Ok(document)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Resolves a dot-delimited field path into the payload.
    ///
    /// Returns `None` when the path does not resolve; see [Value::at_path].
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.body.at_path(path)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::common::to_json(self))
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
