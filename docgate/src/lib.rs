//! # docgate - Document Store HTTP Gateway
//!
//! docgate is a minimal HTTP gateway exposing generic query and upsert
//! operations over a document store. It is a pass-through façade: the
//! store owns persistence, docgate owns routing, filter building, and
//! result delivery.
//!
//! ## Key Features
//!
//! - **Ordered routing**: regex pattern→handler registry where the first
//!   registered match wins, with positional parameter capture
//! - **Declarative filters**: per-field predicates (equals, not-equals,
//!   exists, regex) composed by AND, buildable from query parameters
//! - **Materialized or streamed queries**: results as a vector or as a
//!   cancellable, bounded asynchronous sequence
//! - **Classified upserts**: replace-or-insert with an explicit outcome
//!   taxonomy
//! - **Pluggable store**: a small provider trait with an in-memory
//!   backend included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docgate::gateway::Gateway;
//! use docgate::gateway_config::GatewayConfig;
//! use docgate::filter::{all, Filterlet};
//! use docgate::common::Value;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::init_global(GatewayConfig::from_env())?;
//!
//! let users = gateway.database().collection("users");
//! users.set("alice", Value::from_json(r#"{"status": "active"}"#)?);
//!
//! let active = users.find(&all().add("status", Filterlet::new().equals("active")))?;
//! assert_eq!(active.len(), 1);
//!
//! gateway.serve()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, write results, and the query/upsert
//!   execution layer
//! - [`common`] - The payload value model and shared utilities
//! - [`endpoints`] - The HTTP surface: data endpoints, hello, fallback
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Query filters and query-parameter decoding
//! - [`gateway`] - The gateway façade and global initialization
//! - [`gateway_config`] - Environment-driven configuration
//! - [`http`] - Minimal HTTP/1.1 transport
//! - [`router`] - Ordered pattern-matched dispatch
//! - [`store`] - Storage backend abstraction and the in-memory provider

pub mod collection;
pub mod common;
pub mod endpoints;
pub mod errors;
pub mod filter;
pub mod gateway;
pub mod gateway_config;
pub mod http;
pub mod router;
pub mod store;

pub use common::Value;
