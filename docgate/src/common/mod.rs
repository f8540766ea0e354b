//! Common types and utilities shared across the gateway.

mod json;
mod task_util;
mod type_utils;
mod value;

pub use json::*;
pub use task_util::*;
pub use type_utils::*;
pub use value::*;

/// Separator used in dot-delimited field paths.
pub const FIELD_SEPARATOR: char = '.';

/// Wire name of the document identity field.
pub const KEY_FIELD: &str = "_id";

/// Wire name of the opaque payload field.
pub const PAYLOAD_FIELD: &str = "doc";
