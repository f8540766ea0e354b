//! Ordered pattern-matched request dispatch.
//!
//! The router owns an append-only, ordered registry of pattern→handler
//! entries. Dispatch normalizes the inbound path, scans the registry in
//! registration order, and invokes exactly one handler: the first whose
//! pattern matches, even if that handler then declines to act. Ordering is
//! therefore a first-class contract: overlapping patterns must be
//! registered most-specific-first.

mod context;
mod pattern;
#[allow(clippy::module_inception)]
mod router;

pub use context::*;
pub use pattern::*;
pub use router::*;
