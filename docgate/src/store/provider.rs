use std::sync::Arc;

use crate::collection::{Collection, Document};
use crate::common::Value;
use crate::errors::GatewayResult;
use crate::filter::Filter;

/// A server-side iteration handle over a query's matching documents.
///
/// Each item is independently fallible: a record that cannot be decoded
/// yields a `DecodeFailure` error without ending the iteration, while a
/// transport-level error carries any other kind and aborts the consumer.
pub type DocumentCursor = Box<dyn Iterator<Item = GatewayResult<Document>> + Send>;

/// The raw result of a provider-level upsert, before classification into a
/// [WriteResult].
///
/// [WriteResult]: crate::collection::WriteResult
#[derive(Clone, Debug, PartialEq)]
pub enum UpsertOutcome {
    /// An existing document's payload was replaced; the store returned no
    /// new identifier.
    Replaced,
    /// The store created a new record and returned its identifier, typed
    /// however the store types identifiers.
    Created(Value),
}

/// Low-level contract for a document store backend.
///
/// # Purpose
/// Defines the boundary to the externally owned store. The gateway is a
/// pass-through façade: it owns no persistence format, performs no schema
/// validation, and delegates per-operation atomicity entirely to the
/// provider.
///
/// # Key responsibilities
/// - **Lifecycle**: open the connection, answer pings, close
/// - **Query**: compile a [Filter] and serve a [DocumentCursor] over the
///   matches, in the store's natural iteration order
/// - **Upsert**: atomic replace-or-insert keyed by the document key
/// - **Catalog**: list collection names per database
///
/// # Thread safety
/// Implementers must be `Send + Sync`; the pooled provider handle is the
/// one process-wide shared resource and its internal concurrency safety is
/// assumed rather than re-implemented here.
pub trait StoreProvider: Send + Sync {
    /// Opens or connects the store. Called once before any other
    /// operation.
    fn open(&self) -> GatewayResult<()>;

    /// Verifies the store is reachable.
    fn ping(&self) -> GatewayResult<()>;

    /// Releases the connection. Operations after close fail.
    fn close(&self) -> GatewayResult<()>;

    /// Lists the collection names in a database.
    fn collection_names(&self, database: &str) -> GatewayResult<Vec<String>>;

    /// Compiles `filter` into a store query over `collection` and opens a
    /// cursor over the matches.
    ///
    /// Filter field paths address only the document payload; the store
    /// must never match a document's own key as a payload field. A filter
    /// the store cannot compile (for example an invalid regex pattern)
    /// rejects the query here, before any cursor exists.
    fn query(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> GatewayResult<DocumentCursor>;

    /// Atomically replaces or inserts the document under `key`.
    fn upsert(
        &self,
        database: &str,
        collection: &str,
        key: &str,
        body: Value,
    ) -> GatewayResult<UpsertOutcome>;
}

/// A handle to a connected document store.
///
/// `Store` wraps the provider behind an `Arc`, so clones are cheap and all
/// clones share one pooled connection. Databases and collections are
/// lightweight named views over the same provider.
#[derive(Clone)]
pub struct Store {
    provider: Arc<dyn StoreProvider>,
}

impl Store {
    /// Opens the provider, verifies it with a ping, and returns the
    /// connected handle.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if opening or pinging fails; no handle
    /// is produced for an unreachable store.
    pub fn connect(provider: impl StoreProvider + 'static) -> GatewayResult<Store> {
        let store = Store {
            provider: Arc::new(provider),
        };
        store.provider.open()?;
        store.provider.ping()?;
        log::info!("Store connected");
        Ok(store)
    }

    /// Verifies the store is still reachable.
    pub fn ping(&self) -> GatewayResult<()> {
        self.provider.ping()
    }

    /// Releases the store connection.
    pub fn disconnect(&self) -> GatewayResult<()> {
        self.provider.close()
    }

    /// Returns a handle to the named database.
    pub fn database(&self, name: &str) -> Database {
        Database {
            provider: self.provider.clone(),
            name: name.to_string(),
        }
    }
}

/// A named database owned by the store connection.
#[derive(Clone)]
pub struct Database {
    provider: Arc<dyn StoreProvider>,
    name: String,
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a handle to the named collection.
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(self.provider.clone(), self.name.clone(), name.to_string())
    }

    /// Lists the collection names in this database.
    pub fn collection_names(&self) -> GatewayResult<Vec<String>> {
        self.provider.collection_names(&self.name)
    }
}
