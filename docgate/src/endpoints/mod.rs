//! The gateway's HTTP surface: generic data endpoints, the demo hello
//! endpoint, and the not-found fallback.

mod data;
mod hello;

pub use data::*;
pub use hello::*;

use std::sync::Arc;

use crate::errors::GatewayResult;
use crate::http::Status;
use crate::router::{RequestContext, RoutePattern, Router};
use crate::store::Store;

/// Registers the gateway endpoints.
///
/// Registration order is the routing contract: the keyed data route comes
/// before the collection route, and both come before the hello routes, so
/// the most specific pattern always wins.
pub fn register_endpoints(router: &mut Router, store: &Store) -> GatewayResult<()> {
    router.register(
        RoutePattern::exact(r"api/data/([^/]+)/([^/]+)/([^/]+)/")?,
        keyed_data_handler(store),
    );
    router.register(
        RoutePattern::exact(r"api/data/([^/]+)/([^/]+)/")?,
        data_handler(store),
    );
    router.register(RoutePattern::prefix(r"api/hello/")?, Arc::new(hello));
    router.register(
        RoutePattern::exact(r"hello/([^/]+)/([^/]+)/")?,
        Arc::new(hello),
    );
    router.set_fallback(Arc::new(not_found));
    Ok(())
}

/// Fallback for paths no pattern matched.
pub fn not_found(ctx: &mut RequestContext) {
    let body = serde_json::json!({
        "error": "not found",
        "path": ctx.path(),
    });
    ctx.write_status(Status::NotFound);
    ctx.write_json(&body);
}
