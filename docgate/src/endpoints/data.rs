use std::sync::Arc;

use crate::collection::{Collection, WriteResult};
use crate::errors::{ErrorKind, GatewayError};
use crate::filter;
use crate::http::Status;
use crate::router::{Handler, RequestContext};
use crate::store::Store;

/// Handler for `api/data/{db}/{collection}/`.
///
/// GET queries the collection with a filter decoded from the query
/// parameters (see [filter::from_query_params]) and responds with a JSON
/// array of wire documents. Every other method gets a method-not-allowed
/// answer from the handler itself; the dispatcher never filters by
/// method.
pub fn data_handler(store: &Store) -> Handler {
    let store = store.clone();
    Arc::new(move |ctx| {
        let Some(collection) = routed_collection(ctx, &store) else {
            return;
        };
        let method = ctx.method().to_string();
        match method.as_str() {
            "GET" => query_collection(ctx, &collection),
            other => method_not_allowed(ctx, other, "GET"),
        }
    })
}

/// Handler for `api/data/{db}/{collection}/{key}/`.
///
/// GET responds with the single document stored under the path key, or a
/// not-found body. POST and PUT upsert the JSON request body as the new
/// payload under the path key and respond with the classified write
/// result.
pub fn keyed_data_handler(store: &Store) -> Handler {
    let store = store.clone();
    Arc::new(move |ctx| {
        let Some(collection) = routed_collection(ctx, &store) else {
            return;
        };
        let key = ctx.params()[2].clone();
        let method = ctx.method().to_string();
        match method.as_str() {
            "GET" => get_document(ctx, &collection, &key),
            "POST" | "PUT" => upsert_document(ctx, &collection, &key),
            other => method_not_allowed(ctx, other, "GET, POST, PUT"),
        }
    })
}

fn routed_collection(ctx: &mut RequestContext, store: &Store) -> Option<Collection> {
    let params = ctx.params();
    if params.len() < 2 {
        ctx.write_error(
            "Route params missing: ",
            &GatewayError::new(
                "data routes need a database and a collection",
                ErrorKind::InvalidOperation,
            ),
            Status::InternalServerError,
        );
        return None;
    }
    Some(store.database(&params[0]).collection(&params[1]))
}

fn method_not_allowed(ctx: &mut RequestContext, method: &str, allowed: &str) {
    let message = format!("Method {} not supported here; use {}\n", method, allowed);
    ctx.write_status(Status::MethodNotAllowed);
    ctx.write_string(&message);
}

fn query_collection(ctx: &mut RequestContext, collection: &Collection) {
    let filter = filter::from_query_params(&ctx.query_params());
    match collection.find(&filter) {
        Ok(documents) => ctx.write_json(&documents),
        Err(err) => ctx.write_error("Query failed: ", &err, Status::BadGateway),
    }
}

fn get_document(ctx: &mut RequestContext, collection: &Collection, key: &str) {
    match collection.find(&filter::all()) {
        Ok(documents) => match documents.into_iter().find(|d| d.key() == key) {
            Some(document) => ctx.write_json(&document),
            None => {
                ctx.write_status(Status::NotFound);
                ctx.write_json(&serde_json::json!({
                    "error": "document not found",
                    "key": key,
                }));
            }
        },
        Err(err) => ctx.write_error("Query failed: ", &err, Status::BadGateway),
    }
}

fn upsert_document(ctx: &mut RequestContext, collection: &Collection, key: &str) {
    let body = match ctx.body_json() {
        Ok(value) => value,
        Err(err) => {
            ctx.write_error("Invalid JSON body: ", &err, Status::UnprocessableEntity);
            return;
        }
    };

    let result = collection.set(key, body);
    let status = match &result {
        WriteResult::Inserted(_) => Status::Created,
        WriteResult::Updated(_) => Status::Ok,
        WriteResult::RequestFailure(_) => Status::BadGateway,
        WriteResult::TypecastFailure(_) => Status::InternalServerError,
    };
    ctx.write_status(status);
    ctx.write_json(&result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RawRequest, Response};
    use crate::router::Router;
    use crate::store::InMemoryStore;

    fn routed_store() -> (Router, Store) {
        let store = Store::connect(InMemoryStore::new()).unwrap();
        let mut router = Router::new();
        crate::endpoints::register_endpoints(&mut router, &store).unwrap();
        (router, store)
    }

    fn body_text(response: &Response) -> String {
        String::from_utf8_lossy(response.body()).into_owned()
    }

    #[test]
    fn test_upsert_then_query_round_trip() {
        let (router, _store) = routed_store();

        let created = router.dispatch(
            RawRequest::build("POST", "/api/data/appdb/users/alice")
                .with_body(br#"{"status": "active"}"#.to_vec()),
        );
        assert_eq!(created.status(), Status::Created);
        assert!(body_text(&created).contains(r#""action":"insert""#));

        let updated = router.dispatch(
            RawRequest::build("PUT", "/api/data/appdb/users/alice")
                .with_body(br#"{"status": "stale"}"#.to_vec()),
        );
        assert_eq!(updated.status(), Status::Ok);
        assert!(body_text(&updated).contains(r#""action":"update""#));

        let queried = router.dispatch(RawRequest::build(
            "GET",
            "/api/data/appdb/users/?status=stale",
        ));
        assert_eq!(queried.status(), Status::Ok);
        let text = body_text(&queried);
        assert!(text.contains(r#""_id":"alice""#));
        assert!(text.contains(r#""status":"stale""#));
    }

    #[test]
    fn test_query_with_no_matches_is_empty_array() {
        let (router, _store) = routed_store();
        let response =
            router.dispatch(RawRequest::build("GET", "/api/data/appdb/users/?missing=x"));
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(body_text(&response), "[]");
    }

    #[test]
    fn test_keyed_get_finds_single_document() {
        let (router, _store) = routed_store();
        router.dispatch(
            RawRequest::build("POST", "/api/data/appdb/users/alice")
                .with_body(br#"{"n": 1}"#.to_vec()),
        );

        let found = router.dispatch(RawRequest::build("GET", "/api/data/appdb/users/alice"));
        assert_eq!(found.status(), Status::Ok);
        assert!(body_text(&found).contains(r#""_id":"alice""#));

        let missing = router.dispatch(RawRequest::build("GET", "/api/data/appdb/users/bob"));
        assert_eq!(missing.status(), Status::NotFound);
    }

    #[test]
    fn test_upsert_rejects_malformed_body() {
        let (router, _store) = routed_store();
        let response = router.dispatch(
            RawRequest::build("POST", "/api/data/appdb/users/alice")
                .with_body(b"{broken".to_vec()),
        );
        assert_eq!(response.status(), Status::UnprocessableEntity);
    }

    #[test]
    fn test_method_branching_is_handler_internal() {
        let (router, _store) = routed_store();
        let response = router.dispatch(RawRequest::build("DELETE", "/api/data/appdb/users/"));
        assert_eq!(response.status(), Status::MethodNotAllowed);
    }

    #[test]
    fn test_fallback_answers_unrouted_paths() {
        let (router, _store) = routed_store();
        let response = router.dispatch(RawRequest::build("GET", "/api/unknown/"));
        assert_eq!(response.status(), Status::NotFound);
        assert!(body_text(&response).contains("not found"));
    }
}
