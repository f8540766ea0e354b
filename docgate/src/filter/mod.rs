//! Declarative query filters for selecting documents from collections.
//!
//! A [Filter] is an ordered set of `(field path, Filterlet)` entries that
//! are conjoined across fields; a [Filterlet] is an ordered set of
//! [Predicate]s on one field that are conjoined within the field. The
//! neutral filter from [all] has zero entries and matches every document.
//!
//! # Creating filters
//!
//! ```rust,ignore
//! use docgate::filter::{all, Filterlet};
//!
//! // match every document
//! let everything = all();
//!
//! // status == "active" AND status != "stale", on one field
//! let filterlet = Filterlet::new().equals("active").not_equals("stale");
//! let filter = all().add("status", filterlet);
//!
//! // AND across fields
//! let filter = all()
//!     .add("status", Filterlet::new().equals("active"))
//!     .add("owner.id", Filterlet::new().exists(true));
//! ```
//!
//! Field paths always address the document payload; a document's own key
//! is never matched by a filter entry.

#[allow(clippy::module_inception)]
mod filter;
mod query_params;

pub use filter::*;
pub use query_params::*;
