use http::Method;

use waypoint::dispatcher::handler;
use waypoint::router::{Lookup, Route, RouteError, Router};

fn noop_route(name: &str, method: Method, pattern: &str) -> Route {
    Route::new(name, method, pattern, vec![handler(|_req, _rw| {})])
}

fn must_match<'r>(router: &'r Router, method: &Method, path: &str) -> waypoint::RouteMatch<'r> {
    match router.lookup(method, path) {
        Lookup::Matched(m) => m,
        other => panic!("expected a match for {method} {path}, got {other:?}"),
    }
}

#[test]
fn static_route_matches_with_empty_params() {
    let router = Router::with_routes(vec![noop_route("list", Method::GET, "/users")])
        .expect("router should build");

    let m = must_match(&router, &Method::GET, "/users");
    assert_eq!(m.route.name, "list");
    assert!(m.params.is_empty());
}

#[test]
fn params_are_extracted_by_name() {
    let router = Router::with_routes(vec![noop_route(
        "get_user_note",
        Method::GET,
        "/users/:email/notes/:note_id",
    )])
    .expect("router should build");

    let m = must_match(&router, &Method::GET, "/users/jane@example.com/notes/42");
    assert_eq!(m.get_param("email"), Some("jane@example.com"));
    assert_eq!(m.get_param("note_id"), Some("42"));
    assert_eq!(m.get_param("missing"), None);
    assert_eq!(m.params.len(), 2);
}

#[test]
fn first_registered_route_wins_on_overlap() {
    let router = Router::with_routes(vec![
        noop_route("param", Method::GET, "/a/:x"),
        noop_route("fixed", Method::GET, "/a/fixed"),
    ])
    .expect("router should build");

    let m = must_match(&router, &Method::GET, "/a/fixed");
    assert_eq!(m.route.name, "param");
    assert_eq!(m.get_param("x"), Some("fixed"));
}

#[test]
fn path_match_is_method_scoped() {
    let router = Router::with_routes(vec![noop_route("create", Method::POST, "/users")])
        .expect("router should build");

    assert!(matches!(
        router.lookup(&Method::GET, "/users"),
        Lookup::NotFound
    ));
    assert!(matches!(
        router.lookup(&Method::POST, "/users"),
        Lookup::Matched(_)
    ));
}

#[test]
fn unsupported_method_is_not_implemented_never_not_found() {
    let router = Router::with_routes(vec![noop_route("list", Method::GET, "/users")])
        .expect("router should build");

    assert!(matches!(
        router.lookup(&Method::TRACE, "/users"),
        Lookup::NotImplemented
    ));
    assert!(matches!(
        router.lookup(&Method::TRACE, "/no/such/path"),
        Lookup::NotImplemented
    ));
}

#[test]
fn trailing_slash_is_rejected_by_default() {
    let router = Router::with_routes(vec![
        noop_route("strict", Method::GET, "/strict"),
        noop_route("lenient", Method::GET, "/lenient").with_trailing_slash(),
        noop_route("lenient_param", Method::GET, "/users/:id").with_trailing_slash(),
    ])
    .expect("router should build");

    assert!(matches!(
        router.lookup(&Method::GET, "/strict/"),
        Lookup::NotFound
    ));
    assert!(matches!(
        router.lookup(&Method::GET, "/lenient"),
        Lookup::Matched(_)
    ));
    assert!(matches!(
        router.lookup(&Method::GET, "/lenient/"),
        Lookup::Matched(_)
    ));

    let m = must_match(&router, &Method::GET, "/users/7/");
    assert_eq!(m.get_param("id"), Some("7"));
}

#[test]
fn wildcard_captures_and_gives_back_the_trailing_literal() {
    let router = Router::with_routes(vec![
        noop_route("tail", Method::GET, "/files/*path"),
        noop_route("download", Method::GET, "/archive/*path/download"),
    ])
    .expect("router should build");

    let m = must_match(&router, &Method::GET, "/files/reports/2026/q1.pdf");
    assert_eq!(m.get_param("path"), Some("reports/2026/q1.pdf"));

    let m = must_match(&router, &Method::GET, "/archive/a/b/download");
    assert_eq!(m.get_param("path"), Some("a/b"));

    assert!(matches!(
        router.lookup(&Method::GET, "/archive/a/b"),
        Lookup::NotFound
    ));
}

#[test]
fn extra_segments_do_not_match() {
    let router = Router::with_routes(vec![noop_route("one", Method::GET, "/users/:id")])
        .expect("router should build");

    assert!(matches!(
        router.lookup(&Method::GET, "/users/7/extra"),
        Lookup::NotFound
    ));
    assert!(matches!(
        router.lookup(&Method::GET, "/users"),
        Lookup::NotFound
    ));
}

#[test]
fn registering_an_unsupported_method_is_fatal() {
    let mut router = Router::new();
    let err = router
        .add(noop_route("bad", Method::TRACE, "/trace"))
        .expect_err("TRACE routes must be rejected");
    assert!(matches!(err, RouteError::UnsupportedMethod { .. }));
}

#[test]
fn registering_without_handlers_is_fatal() {
    let mut router = Router::new();
    let err = router
        .add(Route::new("empty", Method::GET, "/empty", vec![]))
        .expect_err("handlerless routes must be rejected");
    assert!(matches!(err, RouteError::NoHandlers { .. }));
}

#[test]
fn duplicate_names_are_reported_but_not_fatal() {
    let router = Router::with_routes(vec![
        noop_route("same", Method::GET, "/one"),
        noop_route("same", Method::GET, "/two"),
    ])
    .expect("duplicate names should still register");
    assert_eq!(router.len(), 2);
}
