use regex::Regex;
use std::fmt::{Display, Formatter};

use crate::errors::{ErrorKind, GatewayError, GatewayResult};

/// How a pattern is anchored against the normalized path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Anchored at the start only; the pattern matches any path that
    /// begins with it.
    Prefix,
    /// Anchored at both ends; the pattern must cover the whole path.
    Exact,
}

/// A compiled, case-insensitive route pattern.
///
/// The source is itself a regex; capture groups become the handler's
/// positional params. There is no implicit full-path default; the builder
/// of a pattern chooses [prefix] or [exact] anchoring explicitly.
///
/// Patterns match normalized paths, which never begin with a separator and
/// always end with one: register `api/auth/`, not `/api/auth`.
///
/// [prefix]: RoutePattern::prefix
/// [exact]: RoutePattern::exact
#[derive(Clone, Debug)]
pub struct RoutePattern {
    regex: Regex,
    source: String,
    anchor: Anchor,
}

impl RoutePattern {
    /// Compiles a case-insensitive pattern anchored at the start only.
    ///
    /// # Errors
    ///
    /// A pattern that fails to compile is a startup-time fatal condition,
    /// reported here to the caller, never deferred to dispatch.
    pub fn prefix(source: &str) -> GatewayResult<RoutePattern> {
        Self::compile(source, Anchor::Prefix)
    }

    /// Compiles a case-insensitive pattern anchored at both ends.
    ///
    /// # Errors
    ///
    /// Same contract as [RoutePattern::prefix]: compile failure is
    /// reported to the caller at registration time.
    pub fn exact(source: &str) -> GatewayResult<RoutePattern> {
        Self::compile(source, Anchor::Exact)
    }

    fn compile(source: &str, anchor: Anchor) -> GatewayResult<RoutePattern> {
        let anchored = match anchor {
            Anchor::Prefix => format!("(?i)^{}", source),
            Anchor::Exact => format!("(?i)^{}$", source),
        };
        let regex = Regex::new(&anchored).map_err(|err| {
            log::error!("Route pattern {} failed to compile: {}", source, err);
            GatewayError::new(
                &format!("Route pattern {} failed to compile: {}", source, err),
                ErrorKind::PatternError,
            )
        })?;
        Ok(RoutePattern {
            regex,
            source: source.to_string(),
            anchor,
        })
    }

    /// The pattern source as registered, without anchoring.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Attempts a single match against a normalized path. On a match,
    /// capture groups 1..N become the ordered params; a group that did not
    /// participate contributes an empty string.
    pub(crate) fn captures(&self, path: &str) -> Option<Vec<String>> {
        self.regex.captures(path).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|group| group.map_or(String::new(), |m| m.as_str().to_string()))
                .collect()
        })
    }
}

impl Display for RoutePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.anchor {
            Anchor::Prefix => write!(f, "{}...", self.source),
            Anchor::Exact => write!(f, "{}", self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_is_reported_at_registration() {
        let result = RoutePattern::prefix("api/(unclosed/");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::PatternError);
    }

    #[test]
    fn test_prefix_matches_longer_paths() {
        let pattern = RoutePattern::prefix("api/auth/").unwrap();
        assert!(pattern.captures("api/auth/").is_some());
        assert!(pattern.captures("api/auth/token/").is_some());
        assert!(pattern.captures("api/other/").is_none());
    }

    #[test]
    fn test_exact_requires_full_cover() {
        let pattern = RoutePattern::exact("api/auth/").unwrap();
        assert!(pattern.captures("api/auth/").is_some());
        assert!(pattern.captures("api/auth/token/").is_none());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let pattern = RoutePattern::exact("api/auth/").unwrap();
        assert!(pattern.captures("API/Auth/").is_some());
    }

    #[test]
    fn test_captures_become_ordered_params() {
        let pattern = RoutePattern::exact(r"hello/([^/]+)/([^/]+)/").unwrap();
        let params = pattern.captures("hello/jean/luc/").unwrap();
        assert_eq!(params, vec!["jean", "luc"]);
    }

    #[test]
    fn test_unmatched_group_yields_empty_param() {
        let pattern = RoutePattern::exact(r"api/(a)?(b+)/").unwrap();
        let params = pattern.captures("api/bb/").unwrap();
        assert_eq!(params, vec!["", "bb"]);
    }

    #[test]
    fn test_no_captures_yields_empty_params() {
        let pattern = RoutePattern::prefix("api/hello/").unwrap();
        let params = pattern.captures("api/hello/").unwrap();
        assert!(params.is_empty());
    }
}
