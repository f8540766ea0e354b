use itertools::Itertools;
use std::fmt::{Display, Formatter};

use crate::common::Value;

/// A single matching criterion scoped to one field.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Matches if the field is present and equal to the value.
    Equals(Value),
    /// Matches if the field differs from the value or is absent.
    NotEquals(Value),
    /// Matches if the field's presence equals the flag.
    Exists(bool),
    /// Matches if the field holds a string matched by the pattern.
    /// The pattern is compiled when the filter is compiled into a store
    /// query; an invalid pattern rejects the query at that point.
    RegexMatches(String),
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Equals(value) => write!(f, "== {}", value),
            Predicate::NotEquals(value) => write!(f, "!= {}", value),
            Predicate::Exists(exists) => write!(f, "exists({})", exists),
            Predicate::RegexMatches(pattern) => write!(f, "matches({})", pattern),
        }
    }
}

/// An ordered set of [Predicate]s scoped to one field.
///
/// Builder operations chain left to right and each appended predicate is
/// ANDed with the ones before it, so
/// `Filterlet::new().equals("a").not_equals("b")` requires the field to
/// satisfy both. An empty filterlet matches nothing on its own and is
/// rejected by [Filter::add].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filterlet {
    predicates: Vec<Predicate>,
}

impl Filterlet {
    /// Creates an empty filterlet.
    pub fn new() -> Filterlet {
        Filterlet::default()
    }

    /// Appends an equality predicate.
    pub fn equals(mut self, value: impl Into<Value>) -> Filterlet {
        self.predicates.push(Predicate::Equals(value.into()));
        self
    }

    /// Appends an inequality predicate.
    pub fn not_equals(mut self, value: impl Into<Value>) -> Filterlet {
        self.predicates.push(Predicate::NotEquals(value.into()));
        self
    }

    /// Appends a presence/absence predicate.
    pub fn exists(mut self, exists: bool) -> Filterlet {
        self.predicates.push(Predicate::Exists(exists));
        self
    }

    /// Appends a regex predicate. Regex matching is only reachable through
    /// this builder, not through the query-parameter shorthand.
    pub fn regex_matches(mut self, pattern: impl Into<String>) -> Filterlet {
        self.predicates
            .push(Predicate::RegexMatches(pattern.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

impl Display for Filterlet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.predicates.iter().join(" && "))
    }
}

/// An ordered set of `(field path, Filterlet)` entries, conjoined across
/// fields.
///
/// Entries are kept in the order they were added. The same field path may
/// be added more than once: the entries stack and are still ANDed. How a
/// store backend reconciles conflicting predicates stacked on one field is
/// backend-defined, so conflicting duplicates may simply match nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(String, Filterlet)>,
}

/// Returns the neutral filter that matches every document.
pub fn all() -> Filter {
    Filter::default()
}

impl Filter {
    /// Appends one `(field path, filterlet)` entry.
    ///
    /// Adding an empty filterlet is a rejected no-op: a filter never holds
    /// an entry with zero predicates.
    ///
    /// # Arguments
    ///
    /// * `field_path` - Dot-delimited path into the document payload
    /// * `filterlet` - The predicates the field must satisfy
    pub fn add(mut self, field_path: impl Into<String>, filterlet: Filterlet) -> Filter {
        let field_path = field_path.into();
        if filterlet.is_empty() {
            log::warn!("Ignoring empty filterlet for field {}", field_path);
            return self;
        }
        self.entries.push((field_path, filterlet));
        self
    }

    /// The ordered entries of this filter.
    pub fn entries(&self) -> &[(String, Filterlet)] {
        &self.entries
    }

    /// Whether this is the neutral match-all filter.
    pub fn is_match_all(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_match_all() {
            return write!(f, "(all)");
        }
        write!(
            f,
            "({})",
            self.entries
                .iter()
                .map(|(path, filterlet)| format!("{} {}", path, filterlet))
                .join(" && ")
        )
    }
}
