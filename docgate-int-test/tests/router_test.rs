use std::net::SocketAddr;
use std::sync::Arc;

use docgate::http::HttpServer;
use docgate::router::{RoutePattern, Router};
use docgate_int_test::test_util::http_get;

#[ctor::ctor]
fn init_logger() {
    colog::init();
}

fn serve_routes(router: Router) -> SocketAddr {
    let server = HttpServer::bind("127.0.0.1:0", Arc::new(router)).unwrap();
    let addr = server.local_addr().unwrap();
    std::thread::spawn(move || {
        let _ = server.run();
    });
    addr
}

#[test]
fn test_first_registered_pattern_wins_over_http() {
    let mut router = Router::new();
    router.register(
        RoutePattern::exact("users/").unwrap(),
        Arc::new(|ctx| ctx.write_string("exact")),
    );
    router.register(
        RoutePattern::exact("users/.*").unwrap(),
        Arc::new(|ctx| ctx.write_string("wildcard")),
    );
    let addr = serve_routes(router);

    let response = http_get(addr, "/users/");
    assert_eq!(response.body, "exact");

    let response = http_get(addr, "/users/123");
    assert_eq!(response.body, "wildcard");
}

#[test]
fn test_registration_order_controls_overlap() {
    // same patterns, reversed order: the broad one now shadows the narrow
    let mut router = Router::new();
    router.register(
        RoutePattern::exact("users/.*").unwrap(),
        Arc::new(|ctx| ctx.write_string("wildcard")),
    );
    router.register(
        RoutePattern::exact("users/").unwrap(),
        Arc::new(|ctx| ctx.write_string("exact")),
    );
    let addr = serve_routes(router);

    let response = http_get(addr, "/users/");
    assert_eq!(response.body, "wildcard");
}

#[test]
fn test_params_reach_handler_over_http() {
    let mut router = Router::new();
    router.register(
        RoutePattern::exact(r"mini/hello/([^/]+)/([^/]+)/").unwrap(),
        Arc::new(|ctx| {
            let joined = ctx.params().join("+");
            ctx.write_string(&joined);
        }),
    );
    let addr = serve_routes(router);

    let response = http_get(addr, "/mini/hello/jean/luc");
    assert_eq!(response.body, "jean+luc");
}

#[test]
fn test_prefix_routes_receive_subpaths() {
    let mut router = Router::new();
    router.register(
        RoutePattern::prefix("api/auth/").unwrap(),
        Arc::new(|ctx| {
            let path = ctx.path().to_string();
            ctx.write_string(&path);
        }),
    );
    let addr = serve_routes(router);

    let response = http_get(addr, "/api/auth/session/check");
    assert_eq!(response.body, "api/auth/session/check/");
}
