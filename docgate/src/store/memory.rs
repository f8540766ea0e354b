use dashmap::DashMap;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collection::Document;
use crate::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor};
use crate::errors::{ErrorKind, GatewayError, GatewayResult};
use crate::filter::{Filter, Predicate};
use crate::store::{DocumentCursor, StoreProvider, UpsertOutcome};

/// Documents of one collection, keyed by document key in insertion order.
/// Insertion order is the store's natural cursor order.
type DocumentMap = Atomic<IndexMap<String, Value>>;

#[derive(Default)]
struct DatabaseShard {
    collections: DashMap<String, DocumentMap>,
}

/// In-memory implementation of a document store.
///
/// # Purpose
/// `InMemoryStore` provides a complete in-memory backend suitable for
/// tests, temporary data, and self-contained gateway operation. All data
/// lives in concurrent maps; nothing survives `close`.
///
/// # Characteristics
/// - **Thread-safe**: databases and collections are concurrent maps,
///   documents are guarded per collection
/// - **Ordered**: a cursor iterates documents in insertion order
/// - **Direct evaluation**: filters are compiled once per query and
///   evaluated against stored payloads; an invalid regex predicate
///   rejects the query before a cursor is opened
/// - **No persistence**: temporary storage only
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    databases: DashMap<String, DatabaseShard>,
    open: AtomicBool,
}

impl InMemoryStoreInner {
    fn ensure_open(&self) -> GatewayResult<()> {
        if !self.open.load(Ordering::SeqCst) {
            log::error!("In-memory store is not connected");
            return Err(GatewayError::new(
                "In-memory store is not connected",
                ErrorKind::TransportFailure,
            ));
        }
        Ok(())
    }

    fn document_map(&self, database: &str, collection: &str) -> DocumentMap {
        let shard = self.databases.entry(database.to_string()).or_default();
        let map = shard
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| atomic(IndexMap::new()))
            .clone();
        map
    }
}

impl StoreProvider for InMemoryStore {
    fn open(&self) -> GatewayResult<()> {
        self.inner.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn ping(&self) -> GatewayResult<()> {
        self.inner.ensure_open()
    }

    fn close(&self) -> GatewayResult<()> {
        self.inner.open.store(false, Ordering::SeqCst);
        self.inner.databases.clear();
        Ok(())
    }

    fn collection_names(&self, database: &str) -> GatewayResult<Vec<String>> {
        self.inner.ensure_open()?;
        let mut names = match self.inner.databases.get(database) {
            Some(shard) => shard
                .collections
                .iter()
                .map(|entry| entry.key().clone())
                .collect(),
            None => Vec::new(),
        };
        names.sort();
        Ok(names)
    }

    fn query(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> GatewayResult<DocumentCursor> {
        self.inner.ensure_open()?;
        let compiled = CompiledFilter::compile(filter)?;

        // Snapshot the matches under the read lock; the cursor itself then
        // owns the data and outlives any later mutation.
        let matches: Vec<Document> = match self
            .inner
            .databases
            .get(database)
            .and_then(|shard| shard.collections.get(collection).map(|m| m.value().clone()))
        {
            Some(map) => map.read_with(|documents| {
                documents
                    .iter()
                    .filter(|(_, body)| compiled.matches(body))
                    .map(|(key, body)| Document::from_parts(key.clone(), body.clone()))
                    .collect()
            }),
            None => Vec::new(),
        };

        Ok(Box::new(matches.into_iter().map(Ok)))
    }

    fn upsert(
        &self,
        database: &str,
        collection: &str,
        key: &str,
        body: Value,
    ) -> GatewayResult<UpsertOutcome> {
        self.inner.ensure_open()?;
        let map = self.inner.document_map(database, collection);
        let outcome = map.write_with(|documents| {
            match documents.insert(key.to_string(), body) {
                Some(_) => UpsertOutcome::Replaced,
                None => UpsertOutcome::Created(Value::String(key.to_string())),
            }
        });
        Ok(outcome)
    }
}

/// One filter entry compiled for direct evaluation.
enum CompiledPredicate {
    Equals(Value),
    NotEquals(Value),
    Exists(bool),
    Regex(Regex),
}

struct CompiledFilter {
    entries: Vec<(String, Vec<CompiledPredicate>)>,
}

impl CompiledFilter {
    fn compile(filter: &Filter) -> GatewayResult<CompiledFilter> {
        let mut entries = Vec::with_capacity(filter.entries().len());
        for (path, filterlet) in filter.entries() {
            let mut predicates = Vec::with_capacity(filterlet.predicates().len());
            for predicate in filterlet.predicates() {
                predicates.push(match predicate {
                    Predicate::Equals(value) => CompiledPredicate::Equals(value.clone()),
                    Predicate::NotEquals(value) => CompiledPredicate::NotEquals(value.clone()),
                    Predicate::Exists(exists) => CompiledPredicate::Exists(*exists),
                    Predicate::RegexMatches(pattern) => {
                        let regex = Regex::new(pattern).map_err(|err| {
                            log::error!(
                                "Query rejected: invalid regex for field {}: {}",
                                path,
                                err
                            );
                            GatewayError::new(
                                &format!("Invalid regex for field {}: {}", path, err),
                                ErrorKind::FilterError,
                            )
                        })?;
                        CompiledPredicate::Regex(regex)
                    }
                });
            }
            entries.push((path.clone(), predicates));
        }
        Ok(CompiledFilter { entries })
    }

    /// Evaluates the filter against a document payload. Field paths
    /// resolve into the payload only, so a document's key is never
    /// matched.
    fn matches(&self, body: &Value) -> bool {
        self.entries.iter().all(|(path, predicates)| {
            let resolved = body.at_path(path);
            predicates.iter().all(|predicate| match predicate {
                CompiledPredicate::Equals(value) => resolved == Some(value),
                // absent fields count as "not equal"
                CompiledPredicate::NotEquals(value) => resolved != Some(value),
                CompiledPredicate::Exists(exists) => resolved.is_some() == *exists,
                CompiledPredicate::Regex(regex) => resolved
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| regex.is_match(s)),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{all, Filterlet};

    fn connected_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.open().unwrap();
        store
    }

    fn put(store: &InMemoryStore, key: &str, json: &str) {
        store
            .upsert("db", "test", key, Value::from_json(json).unwrap())
            .unwrap();
    }

    fn find(store: &InMemoryStore, filter: &Filter) -> Vec<String> {
        store
            .query("db", "test", filter)
            .unwrap()
            .map(|item| item.unwrap().key().to_string())
            .collect()
    }

    #[test]
    fn test_operations_require_open() {
        let store = InMemoryStore::new();
        assert!(store.ping().is_err());
        assert!(store.query("db", "test", &all()).is_err());
        assert!(store.upsert("db", "test", "k", Value::Null).is_err());
    }

    #[test]
    fn test_upsert_classifies_insert_then_replace() {
        let store = connected_store();
        let first = store
            .upsert("db", "test", "k1", Value::from_json("{}").unwrap())
            .unwrap();
        assert_eq!(
            first,
            UpsertOutcome::Created(Value::String("k1".to_string()))
        );

        let second = store
            .upsert("db", "test", "k1", Value::from_json(r#"{"v": 2}"#).unwrap())
            .unwrap();
        assert_eq!(second, UpsertOutcome::Replaced);
    }

    #[test]
    fn test_match_all_returns_every_document_once_in_insertion_order() {
        let store = connected_store();
        put(&store, "b", r#"{"n": 1}"#);
        put(&store, "a", r#"{"n": 2}"#);
        put(&store, "c", r#"{"n": 3}"#);

        assert_eq!(find(&store, &all()), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_replace_keeps_cursor_position() {
        let store = connected_store();
        put(&store, "b", r#"{"n": 1}"#);
        put(&store, "a", r#"{"n": 2}"#);
        put(&store, "b", r#"{"n": 9}"#);

        assert_eq!(find(&store, &all()), vec!["b", "a"]);
    }

    #[test]
    fn test_equals_filter() {
        let store = connected_store();
        put(&store, "alice", r#"{"status": "active"}"#);
        put(&store, "bob", r#"{"status": "stale"}"#);

        let filter = all().add("status", Filterlet::new().equals("active"));
        assert_eq!(find(&store, &filter), vec!["alice"]);
    }

    #[test]
    fn test_not_equals_matches_absent_fields() {
        let store = connected_store();
        put(&store, "alice", r#"{"status": "active"}"#);
        put(&store, "ghost", r#"{"other": 1}"#);

        let filter = all().add("status", Filterlet::new().not_equals("active"));
        assert_eq!(find(&store, &filter), vec!["ghost"]);
    }

    #[test]
    fn test_exists_partitions_collection() {
        let store = connected_store();
        put(&store, "a", r#"{"flag": 1}"#);
        put(&store, "b", r#"{"flag": null}"#);
        put(&store, "c", r#"{"other": 1}"#);

        let present = find(&store, &all().add("flag", Filterlet::new().exists(true)));
        let absent = find(&store, &all().add("flag", Filterlet::new().exists(false)));

        // no overlap, full coverage; null still counts as present
        assert_eq!(present, vec!["a", "b"]);
        assert_eq!(absent, vec!["c"]);
    }

    #[test]
    fn test_nested_path_filter_never_matches_key() {
        let store = connected_store();
        put(&store, "active", r#"{"user": {"status": "stale"}}"#);
        put(&store, "k2", r#"{"user": {"status": "active"}}"#);

        let filter = all().add("user.status", Filterlet::new().equals("active"));
        assert_eq!(find(&store, &filter), vec!["k2"]);
    }

    #[test]
    fn test_regex_filter_matches_strings_only() {
        let store = connected_store();
        put(&store, "a", r#"{"email": "alice@example.com"}"#);
        put(&store, "b", r#"{"email": 42}"#);
        put(&store, "c", r#"{"email": "bob@other.org"}"#);

        let filter = all().add(
            "email",
            Filterlet::new().regex_matches(r".*@example\.com"),
        );
        assert_eq!(find(&store, &filter), vec!["a"]);
    }

    #[test]
    fn test_invalid_regex_rejects_query_before_cursor() {
        let store = connected_store();
        put(&store, "a", r#"{"x": "y"}"#);

        let filter = all().add("x", Filterlet::new().regex_matches("("));
        let result = store.query("db", "test", &filter);
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn test_stacked_entries_on_one_field_are_anded() {
        let store = connected_store();
        put(&store, "a", r#"{"n": "x"}"#);

        let compatible = all()
            .add("n", Filterlet::new().exists(true))
            .add("n", Filterlet::new().equals("x"));
        assert_eq!(find(&store, &compatible), vec!["a"]);

        let conflicting = all()
            .add("n", Filterlet::new().equals("x"))
            .add("n", Filterlet::new().equals("y"));
        assert!(find(&store, &conflicting).is_empty());
    }

    #[test]
    fn test_query_on_missing_collection_is_empty() {
        let store = connected_store();
        assert!(find(&store, &all()).is_empty());
    }

    #[test]
    fn test_collection_names_sorted() {
        let store = connected_store();
        store.upsert("db", "zeta", "k", Value::Null).unwrap();
        store.upsert("db", "alpha", "k", Value::Null).unwrap();

        assert_eq!(
            store.collection_names("db").unwrap(),
            vec!["alpha", "zeta"]
        );
        assert!(store.collection_names("other").unwrap().is_empty());
    }

    #[test]
    fn test_close_drops_data() {
        let store = connected_store();
        put(&store, "a", r#"{"n": 1}"#);
        store.close().unwrap();
        store.open().unwrap();
        assert!(find(&store, &all()).is_empty());
    }
}
