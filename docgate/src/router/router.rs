use std::sync::Arc;

use crate::http::{RawRequest, Response, Status};
use crate::router::{RequestContext, RoutePattern};

/// A handler bound to a route pattern.
///
/// Handlers receive every method that reaches their pattern: the
/// dispatcher performs no method-based filtering and produces no automatic
/// "405 Method Not Allowed"; a handler that cares about methods branches
/// internally. A handler reports its own failures through the
/// [RequestContext]; the dispatcher does not catch or classify them.
pub type Handler = Arc<dyn Fn(&mut RequestContext) + Send + Sync>;

/// One ordered pattern→handler binding.
pub struct RouteEntry {
    pattern: RoutePattern,
    handler: Handler,
}

impl RouteEntry {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }
}

/// The ordered, pattern-matched request dispatcher.
///
/// Routes are registered once at startup and the table is read-only
/// afterwards; registration order is the matching order and is exposed for
/// inspection through [routes]. Dispatch is synchronous: one inbound
/// request occupies one execution context for the full duration of its
/// handler.
///
/// [routes]: Router::routes
#[derive(Default)]
pub struct Router {
    entries: Vec<RouteEntry>,
    fallback: Option<Handler>,
}

impl Router {
    pub fn new() -> Router {
        Router::default()
    }

    /// Appends a route to the table. There is no removal; overlapping
    /// patterns must be registered most-specific-first.
    pub fn register(&mut self, pattern: RoutePattern, handler: Handler) {
        self.entries.push(RouteEntry { pattern, handler });
    }

    /// Installs the handler invoked when no pattern matches. Without a
    /// fallback, unmatched paths get a standard not-found response.
    pub fn set_fallback(&mut self, handler: Handler) {
        self.fallback = Some(handler);
    }

    /// The registered pattern sources, in matching order.
    pub fn routes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.pattern.source())
            .collect()
    }

    /// Normalizes a raw request path for matching: strips one leading
    /// separator and ensures a trailing one, so `/api/user/123` becomes
    /// `api/user/123/`.
    pub fn normalize_path(raw_path: &str) -> String {
        let mut path = raw_path.strip_prefix('/').unwrap_or(raw_path).to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        path
    }

    /// Dispatches one request to exactly one handler.
    ///
    /// Scans the table in registration order and stops at the first
    /// pattern that matches the normalized path; later entries are never
    /// tried, even if the matched handler declines to act. On a match the
    /// capture groups become the context's ordered params. Without a match
    /// the fallback runs if present, else a standard not-found response is
    /// produced.
    pub fn dispatch(&self, request: RawRequest) -> Response {
        let path = Self::normalize_path(request.path());

        for entry in &self.entries {
            if let Some(params) = entry.pattern.captures(&path) {
                let mut ctx = RequestContext::new(request, path, params);
                (entry.handler)(&mut ctx);
                return ctx.into_response();
            }
        }

        match &self.fallback {
            Some(handler) => {
                let mut ctx = RequestContext::new(request, path, Vec::new());
                handler(&mut ctx);
                ctx.into_response()
            }
            None => {
                let mut response = Response::new();
                response.set_status(Status::NotFound);
                response.append_body(format!("Path {} not found", path).as_bytes());
                response
            }
        }
    }
}
