use indexmap::IndexMap;

use crate::filter::{all, Filter, Filterlet};

/// Ordered multimap of query parameters: first-seen key order, values in
/// arrival order.
pub type QueryParams = IndexMap<String, Vec<String>>;

/// Builds a [Filter] from query parameters.
///
/// For every key with a non-empty name:
///
/// * zero associated values → the field must exist;
/// * each value: a leading `=` selects equality with the rest; a leading
///   `-` selects inequality with the rest; the literal `exist` or an empty
///   string selects existence; the literal `not-exist` selects absence;
///   any other value is a bare equality match with the raw string;
/// * multiple values under one key accumulate as additional ANDed
///   predicates on that key's filterlet.
///
/// Regex matching is not reachable through this shorthand, only through
/// direct [Filterlet] construction.
///
/// # Examples
///
/// `?status=active&owner=-bob&tag&flag=not-exist` selects documents where
/// `status` equals `"active"`, `owner` differs from `"bob"`, `tag` exists,
/// and `flag` is absent.
pub fn from_query_params(params: &QueryParams) -> Filter {
    let mut filter = all();
    for (name, values) in params {
        if name.is_empty() {
            continue;
        }

        let mut filterlet = Filterlet::new();
        if values.is_empty() {
            filterlet = filterlet.exists(true);
        }
        for value in values {
            filterlet = if let Some(rest) = value.strip_prefix('=') {
                filterlet.equals(rest)
            } else if let Some(rest) = value.strip_prefix('-') {
                filterlet.not_equals(rest)
            } else if value.is_empty() || value == "exist" {
                filterlet.exists(true)
            } else if value == "not-exist" {
                filterlet.exists(false)
            } else {
                filterlet.equals(value.as_str())
            };
        }

        if !filterlet.is_empty() {
            filter = filter.add(name.clone(), filterlet);
        }
    }
    filter
}
