use http::{Method, StatusCode};
use serde_json::json;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use waypoint::dispatcher::handler;
use waypoint::middleware::middleware;
use waypoint::router::{Route, Router};
use waypoint::server::{send_response, AppService, HttpServer, ServerHandle};

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    port
}

fn start(service: AppService) -> (ServerHandle, u16) {
    let port = free_port();
    let handle = HttpServer(service)
        .start(("127.0.0.1", port))
        .expect("server should start");
    handle.wait_ready().expect("server should become ready");
    (handle, port)
}

fn send_request(port: u16, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("set timeout");
    write!(
        stream,
        "{method} {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n"
    )
    .expect("write request");

    let mut response = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                response.extend_from_slice(&buf[..n]);
                // The server may keep the connection alive, so stop as soon
                // as Content-Length bytes of body have arrived.
                let text = String::from_utf8_lossy(&response);
                if let Some(len) = content_length(&text) {
                    if body_of(&text).len() >= len {
                        break;
                    }
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&response).to_string()
}

fn content_length(response: &str) -> Option<usize> {
    response
        .lines()
        .take_while(|line| !line.is_empty())
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
}

fn body_of(response: &str) -> String {
    response
        .split("\r\n\r\n")
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

fn test_router() -> Router {
    Router::with_routes(vec![
        Route::new(
            "hello",
            Method::GET,
            "/hello",
            vec![handler(|_req, rw| {
                send_response(rw, StatusCode::OK, &json!("hello"));
            })],
        ),
        Route::new(
            "get_user",
            Method::GET,
            "/users/:id",
            vec![handler(|req, rw| {
                send_response(
                    rw,
                    StatusCode::OK,
                    &json!({ "id": req.get_param("id") }),
                );
            })],
        ),
    ])
    .expect("router should build")
}

#[test]
fn serves_a_static_route() {
    waypoint::logging::init();
    let (handle, port) = start(AppService::new(test_router()));

    let response = send_request(port, "GET", "/hello");
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    let body: serde_json::Value =
        serde_json::from_str(&body_of(&response)).expect("json body");
    assert_eq!(body["data"], json!("hello"));
    assert_eq!(body["status"], json!(200));

    handle.stop();
}

#[test]
fn extracts_path_params_end_to_end() {
    waypoint::logging::init();
    let (handle, port) = start(AppService::new(test_router()));

    let response = send_request(port, "GET", "/users/jane");
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    let body: serde_json::Value =
        serde_json::from_str(&body_of(&response)).expect("json body");
    assert_eq!(body["data"]["id"], json!("jane"));

    handle.stop();
}

#[test]
fn misses_map_to_404_and_501() {
    waypoint::logging::init();
    let (handle, port) = start(AppService::new(test_router()));

    let response = send_request(port, "GET", "/no/such/path");
    assert!(response.starts_with("HTTP/1.1 404"), "got: {response}");
    let body: serde_json::Value =
        serde_json::from_str(&body_of(&response)).expect("json body");
    assert_eq!(body["errors"], json!("not found"));

    let response = send_request(port, "TRACE", "/hello");
    assert!(response.starts_with("HTTP/1.1 501"), "got: {response}");

    handle.stop();
}

#[test]
fn middleware_added_last_runs_outermost() {
    waypoint::logging::init();
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut router = Router::with_routes(vec![Route::new(
        "ordered",
        Method::GET,
        "/ordered",
        vec![handler({
            let order = Arc::clone(&order);
            move |_req, rw| {
                order.lock().unwrap().push("handler");
                send_response(rw, StatusCode::OK, &json!("done"));
            }
        })],
    )])
    .expect("router should build");

    for name in ["first", "second"] {
        let order = Arc::clone(&order);
        router.use_middleware(middleware(move |req, rw, next| {
            order.lock().unwrap().push(name);
            next(req, rw);
        }));
    }

    let (handle, port) = start(AppService::new(router));
    let response = send_request(port, "GET", "/ordered");
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert_eq!(
        order.lock().unwrap().as_slice(),
        ["second", "first", "handler"]
    );

    handle.stop();
}

#[test]
fn second_handler_in_a_chain_cannot_overwrite_the_response() {
    waypoint::logging::init();
    let router = Router::with_routes(vec![Route::new(
        "chained",
        Method::GET,
        "/chained",
        vec![
            handler(|_req, rw| {
                send_response(rw, StatusCode::OK, &json!("first"));
            }),
            handler(|_req, rw| {
                send_response(rw, StatusCode::INTERNAL_SERVER_ERROR, &json!("second"));
            }),
        ],
    )])
    .expect("router should build");

    let (handle, port) = start(AppService::new(router));
    let response = send_request(port, "GET", "/chained");
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    let body: serde_json::Value =
        serde_json::from_str(&body_of(&response)).expect("json body");
    assert_eq!(body["data"], json!("first"));

    handle.stop();
}

#[test]
fn custom_not_found_handler_replaces_the_default() {
    waypoint::logging::init();
    let service = AppService::new(test_router()).with_not_found(handler(|req, rw| {
        rw.write_header(StatusCode::NOT_FOUND);
        rw.write(format!("nothing at {}", req.path).as_bytes());
    }));

    let (handle, port) = start(service);
    let response = send_request(port, "GET", "/missing");
    assert!(response.starts_with("HTTP/1.1 404"), "got: {response}");
    assert!(response.ends_with("nothing at /missing"), "got: {response}");

    handle.stop();
}
