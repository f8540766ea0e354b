//! Documents, collections, and the query/upsert execution layer.

#[allow(clippy::module_inception)]
mod collection;
mod document;
mod document_stream;
mod write_result;

pub use collection::*;
pub use document::*;
pub use document_stream::*;
pub use write_result::*;
