use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::endpoints;
use crate::errors::GatewayResult;
use crate::gateway_config::GatewayConfig;
use crate::http;
use crate::router::Router;
use crate::store::{Database, InMemoryStore, Store, StoreProvider};

/// The gateway instance: configuration, the connected store handle, and
/// the route table.
///
/// `Gateway` uses the same cheap-clone shape as the other handles: clones
/// share one inner state through an `Arc`. The route table is populated
/// during [connect] and read-only afterwards, which is what makes
/// concurrent dispatch safe without locks.
///
/// [connect]: Gateway::connect
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    config: GatewayConfig,
    store: Store,
    router: Arc<Router>,
}

impl Gateway {
    /// Connects the store provider, registers the endpoints, and returns
    /// the ready gateway.
    ///
    /// # Arguments
    ///
    /// * `config` - Gateway settings
    /// * `provider` - The store backend to connect
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or pinged, or if an
    /// endpoint pattern fails to compile; both are startup-time fatal
    /// conditions.
    pub fn connect(
        config: GatewayConfig,
        provider: impl StoreProvider + 'static,
    ) -> GatewayResult<Gateway> {
        let store = Store::connect(provider)?;

        let mut router = Router::new();
        endpoints::register_endpoints(&mut router, &store)?;
        log::info!("Registered routes: {:?}", router.routes());

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                config,
                store,
                router: Arc::new(router),
            }),
        })
    }

    /// Initializes the process-wide gateway exactly once and returns it.
    ///
    /// Concurrent callers block until the first initialization completes
    /// and then observe the same instance; there is no spinning and no
    /// partially initialized state. The first caller's configuration wins.
    /// Initialization failure is returned to the caller that triggered it,
    /// and a later call may retry.
    ///
    /// The global gateway runs over the in-memory store provider; embed
    /// [Gateway::connect] directly to supply a different backend.
    pub fn init_global(config: GatewayConfig) -> GatewayResult<&'static Gateway> {
        static INSTANCE: OnceCell<Gateway> = OnceCell::new();
        INSTANCE.get_or_try_init(|| Gateway::connect(config, InMemoryStore::new()))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// The configured default database.
    pub fn database(&self) -> Database {
        self.inner.store.database(self.inner.config.database())
    }

    /// Binds an HTTP server for this gateway without starting the accept
    /// loop, so callers can learn the bound address first.
    pub fn bind(&self, addr: &str) -> GatewayResult<http::HttpServer> {
        http::HttpServer::bind(addr, self.inner.router.clone())
    }

    /// Serves HTTP on the configured address. Blocks the calling thread.
    pub fn serve(&self) -> GatewayResult<()> {
        self.bind(&self.inner.config.http_addr())?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;
    use crate::filter::all;

    #[ctor::ctor]
    fn init_logger() {
        colog::init();
    }

    #[test]
    fn test_connect_builds_routes_and_store() {
        let gateway =
            Gateway::connect(GatewayConfig::default(), InMemoryStore::new()).unwrap();
        assert!(!gateway.router().routes().is_empty());
        assert!(gateway.store().ping().is_ok());
    }

    #[test]
    fn test_default_database_uses_config() {
        let config = GatewayConfig::default().with_database("appdb");
        let gateway = Gateway::connect(config, InMemoryStore::new()).unwrap();
        assert_eq!(gateway.database().name(), "appdb");
    }

    #[test]
    fn test_gateway_round_trip_through_store() {
        let gateway =
            Gateway::connect(GatewayConfig::default(), InMemoryStore::new()).unwrap();
        let collection = gateway.database().collection("users");

        let result = collection.set("k1", Value::from_json(r#"{"n": 1}"#).unwrap());
        assert!(result.is_success());

        let documents = collection.find(&all()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].key(), "k1");
    }

    #[test]
    fn test_init_global_returns_one_instance() {
        let first = Gateway::init_global(GatewayConfig::default()).unwrap();
        let second = Gateway::init_global(GatewayConfig::default()).unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
