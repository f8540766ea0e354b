use std::sync::Arc;

use crate::collection::{Document, DocumentStream, WriteResult};
use crate::common::Value;
use crate::errors::{ErrorKind, GatewayResult};
use crate::filter::Filter;
use crate::store::{StoreProvider, UpsertOutcome};

/// A named collection of documents inside a database, owned by the external
/// store.
///
/// `Collection` is a cheap handle: it carries the pooled store provider and
/// the database/collection names, and every operation is an independent
/// round trip to the store. There is no locking or ordering guarantee
/// between independent calls beyond the store's own per-operation
/// atomicity.
#[derive(Clone)]
pub struct Collection {
    provider: Arc<dyn StoreProvider>,
    database: String,
    name: String,
}

impl Collection {
    pub(crate) fn new(provider: Arc<dyn StoreProvider>, database: String, name: String) -> Self {
        Collection {
            provider,
            database,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Queries the collection and materializes every matching document.
    ///
    /// Zero matches yields an empty vector; that is success, not failure.
    /// A transport/store failure opening or iterating the cursor is
    /// returned as an error, always distinguishable from an empty result.
    /// A record that cannot be decoded is skipped with a diagnostic and
    /// does not abort the rest of the batch, so one malformed record cannot
    /// hide an entire result set.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter to apply; [filter::all] matches everything
    ///
    /// [filter::all]: crate::filter::all
    pub fn find(&self, filter: &Filter) -> GatewayResult<Vec<Document>> {
        let cursor = self.provider.query(&self.database, &self.name, filter)?;

        let mut documents = Vec::new();
        for item in cursor {
            match item {
                Ok(document) => documents.push(document),
                Err(err) if err.kind() == &ErrorKind::DecodeFailure => {
                    log::warn!(
                        "Skipping undecodable record in collection {}: {}",
                        self.name,
                        err
                    );
                }
                Err(err) => {
                    log::error!("Cursor failed for collection {}: {}", self.name, err);
                    return Err(err);
                }
            }
        }
        Ok(documents)
    }

    /// Queries the collection and delivers matching documents through an
    /// asynchronous sequence.
    ///
    /// Opens the same kind of cursor as [find] and spawns exactly one
    /// detached producer bound to the stream's cancel handle. `capacity`
    /// bounds the delivery queue; 0 means a synchronous hand-off between
    /// producer and consumer. See [DocumentStream] for the consumption and
    /// cancellation contract.
    ///
    /// A transport failure opening the cursor is reported here, before any
    /// producer is spawned.
    ///
    /// [find]: Collection::find
    pub fn find_as_stream(
        &self,
        filter: &Filter,
        capacity: usize,
    ) -> GatewayResult<DocumentStream> {
        let cursor = self.provider.query(&self.database, &self.name, filter)?;
        Ok(DocumentStream::spawn(cursor, capacity))
    }

    /// Performs an atomic replace-or-insert keyed by `key`.
    ///
    /// If a document with that key already existed its payload is fully
    /// replaced and the result is `Updated(key)`; otherwise the store
    /// creates it and the result is `Inserted` carrying the store-returned
    /// key. Failures are classified, never raised: a store-level rejection
    /// becomes `RequestFailure` with no state mutated, and a store-returned
    /// identifier of an unexpected type becomes `TypecastFailure`.
    ///
    /// # Arguments
    ///
    /// * `key` - The document key; must not be empty
    /// * `body` - The new payload
    pub fn set(&self, key: &str, body: Value) -> WriteResult {
        if key.is_empty() {
            return WriteResult::RequestFailure("document key must not be empty".to_string());
        }

        match self.provider.upsert(&self.database, &self.name, key, body) {
            Err(err) => {
                log::error!("Upsert failed for collection {}: {}", self.name, err);
                WriteResult::RequestFailure(err.to_string())
            }
            Ok(UpsertOutcome::Replaced) => WriteResult::Updated(key.to_string()),
            Ok(UpsertOutcome::Created(Value::String(new_key))) => WriteResult::Inserted(new_key),
            Ok(UpsertOutcome::Created(other)) => {
                log::error!(
                    "Store returned a non-string identifier for collection {}: {}",
                    self.name,
                    other
                );
                WriteResult::TypecastFailure(format!(
                    "store returned a non-string identifier: {}",
                    other
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GatewayError;
    use crate::filter::all;
    use crate::store::DocumentCursor;

    /// Provider stub with scripted behavior per operation.
    struct StubProvider {
        records: Vec<GatewayResult<Document>>,
        upsert_outcome: GatewayResult<UpsertOutcome>,
        fail_query: bool,
    }

    impl StubProvider {
        fn with_records(records: Vec<GatewayResult<Document>>) -> Self {
            StubProvider {
                records,
                upsert_outcome: Ok(UpsertOutcome::Replaced),
                fail_query: false,
            }
        }

        fn with_upsert(outcome: GatewayResult<UpsertOutcome>) -> Self {
            StubProvider {
                records: Vec::new(),
                upsert_outcome: outcome,
                fail_query: false,
            }
        }

        fn failing() -> Self {
            StubProvider {
                records: Vec::new(),
                upsert_outcome: Ok(UpsertOutcome::Replaced),
                fail_query: true,
            }
        }
    }

    impl StoreProvider for StubProvider {
        fn open(&self) -> GatewayResult<()> {
            Ok(())
        }

        fn ping(&self) -> GatewayResult<()> {
            Ok(())
        }

        fn close(&self) -> GatewayResult<()> {
            Ok(())
        }

        fn collection_names(&self, _database: &str) -> GatewayResult<Vec<String>> {
            Ok(Vec::new())
        }

        fn query(
            &self,
            _database: &str,
            _collection: &str,
            _filter: &Filter,
        ) -> GatewayResult<DocumentCursor> {
            if self.fail_query {
                return Err(GatewayError::new(
                    "store unreachable",
                    ErrorKind::TransportFailure,
                ));
            }
            let records: Vec<_> = self
                .records
                .iter()
                .map(|item| match item {
                    Ok(document) => Ok(document.clone()),
                    Err(err) => Err(err.clone()),
                })
                .collect();
            Ok(Box::new(records.into_iter()))
        }

        fn upsert(
            &self,
            _database: &str,
            _collection: &str,
            _key: &str,
            _body: Value,
        ) -> GatewayResult<UpsertOutcome> {
            match &self.upsert_outcome {
                Ok(outcome) => Ok(outcome.clone()),
                Err(err) => Err(err.clone()),
            }
        }
    }

    fn collection_over(provider: StubProvider) -> Collection {
        Collection::new(Arc::new(provider), "db".to_string(), "test".to_string())
    }

    fn document(key: &str) -> Document {
        Document::new(key, Value::from_json(r#"{"n": 1}"#).unwrap()).unwrap()
    }

    #[test]
    fn test_find_empty_is_success() {
        let collection = collection_over(StubProvider::with_records(Vec::new()));
        let documents = collection.find(&all()).unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_find_transport_failure_is_error_not_empty() {
        let collection = collection_over(StubProvider::failing());
        let result = collection.find(&all());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::TransportFailure);
    }

    #[test]
    fn test_find_skips_undecodable_records() {
        let collection = collection_over(StubProvider::with_records(vec![
            Ok(document("a")),
            Err(GatewayError::new("corrupt", ErrorKind::DecodeFailure)),
            Ok(document("b")),
        ]));
        let documents = collection.find(&all()).unwrap();
        let keys: Vec<&str> = documents.iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_find_aborts_on_mid_iteration_transport_failure() {
        let collection = collection_over(StubProvider::with_records(vec![
            Ok(document("a")),
            Err(GatewayError::new("reset", ErrorKind::TransportFailure)),
            Ok(document("b")),
        ]));
        let result = collection.find(&all());
        assert!(result.is_err());
    }

    #[test]
    fn test_stream_matches_find_order() {
        let records = vec![Ok(document("a")), Ok(document("b")), Ok(document("c"))];
        let collection = collection_over(StubProvider::with_records(records));

        let materialized: Vec<String> = collection
            .find(&all())
            .unwrap()
            .iter()
            .map(|d| d.key().to_string())
            .collect();
        let streamed: Vec<String> = collection
            .find_as_stream(&all(), 0)
            .unwrap()
            .map(|d| d.key().to_string())
            .collect();
        assert_eq!(materialized, streamed);
    }

    #[test]
    fn test_set_rejects_empty_key() {
        let collection = collection_over(StubProvider::with_records(Vec::new()));
        let result = collection.set("", Value::Null);
        assert_eq!(result.action(), "dbreq");
    }

    #[test]
    fn test_set_classifies_replaced_as_updated() {
        let collection = collection_over(StubProvider::with_upsert(Ok(UpsertOutcome::Replaced)));
        let result = collection.set("k1", Value::Null);
        assert_eq!(result, WriteResult::Updated("k1".to_string()));
    }

    #[test]
    fn test_set_classifies_created_string_as_inserted() {
        let collection = collection_over(StubProvider::with_upsert(Ok(UpsertOutcome::Created(
            Value::String("k1".to_string()),
        ))));
        let result = collection.set("k1", Value::Null);
        assert_eq!(result, WriteResult::Inserted("k1".to_string()));
    }

    #[test]
    fn test_set_surfaces_typecast_failure() {
        let collection = collection_over(StubProvider::with_upsert(Ok(UpsertOutcome::Created(
            Value::I64(42),
        ))));
        let result = collection.set("k1", Value::Null);
        assert_eq!(result.action(), "typecast");
    }

    #[test]
    fn test_set_classifies_store_error_as_request_failure() {
        let collection = collection_over(StubProvider::with_upsert(Err(GatewayError::new(
            "store down",
            ErrorKind::TransportFailure,
        ))));
        let result = collection.set("k1", Value::Null);
        assert_eq!(result.action(), "dbreq");
    }
}
