use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// The classified outcome of an upsert, produced once per [set] call and
/// never persisted.
///
/// [set]: crate::collection::Collection::set
///
/// # Variants
///
/// * `Inserted(key)` - the store created a new document under `key`
/// * `Updated(key)` - an existing document's payload was fully replaced
/// * `RequestFailure(reason)` - the store rejected the request; no state
///   was mutated
/// * `TypecastFailure(reason)` - the store reported a freshly inserted
///   record but its returned identifier could not be interpreted as a key.
///   This is surfaced explicitly rather than being folded into `Updated`,
///   so an internal encoding failure can never masquerade as a successful
///   update.
///
/// On the wire a write result is `{"status", "action", "result"}` where
/// `action` is one of `insert`, `update`, `dbreq`, `typecast`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteResult {
    Inserted(String),
    Updated(String),
    RequestFailure(String),
    TypecastFailure(String),
}

impl WriteResult {
    pub fn is_success(&self) -> bool {
        matches!(self, WriteResult::Inserted(_) | WriteResult::Updated(_))
    }

    /// The performed action: `insert`, `update`, `dbreq`, or `typecast`.
    pub fn action(&self) -> &'static str {
        match self {
            WriteResult::Inserted(_) => "insert",
            WriteResult::Updated(_) => "update",
            WriteResult::RequestFailure(_) => "dbreq",
            WriteResult::TypecastFailure(_) => "typecast",
        }
    }

    /// The targeted key on success, or the failure reason.
    pub fn result(&self) -> &str {
        match self {
            WriteResult::Inserted(key) | WriteResult::Updated(key) => key,
            WriteResult::RequestFailure(reason) | WriteResult::TypecastFailure(reason) => reason,
        }
    }

    /// Numeric status carried on the wire: 1 = success, 2 = request
    /// failure, 500 = typecast failure.
    pub fn status(&self) -> u16 {
        match self {
            WriteResult::Inserted(_) | WriteResult::Updated(_) => 1,
            WriteResult::RequestFailure(_) => 2,
            WriteResult::TypecastFailure(_) => 500,
        }
    }
}

impl Display for WriteResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.action(), self.result())
    }
}

impl Serialize for WriteResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("WriteResult", 3)?;
        out.serialize_field("status", &self.status())?;
        out.serialize_field("action", self.action())?;
        out.serialize_field("result", self.result())?;
        out.end()
    }
}
