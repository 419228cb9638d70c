use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .expect("static header names and values are ASCII")
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.into_bytes();
    let len = bytes.len();
    Response::new(
        StatusCode(200),
        vec![header("Content-Type", "text/html; charset=utf-8")],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn no_content() -> Response<Cursor<Vec<u8>>> {
    Response::new(StatusCode(204), vec![], Cursor::new(Vec::new()), Some(0), None)
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = b"404 Not Found".to_vec();
    let len = body.len();
    Response::new(
        StatusCode(404),
        vec![header("Content-Type", "text/plain")],
        Cursor::new(body),
        Some(len),
        None,
    )
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// The SSE handler takes ownership of the request to stream frames for the
/// rest of the run; every other handler returns a response sent here.
pub fn dispatch(request: Request, state: SharedState) {
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or("").to_owned();

    if method == Method::Get && path == "/events" {
        handlers::events::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        (Method::Get,  "/")     => handlers::page::handle_get(&state),
        (Method::Post, "/stop") => handlers::stop::handle_post(&state),
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        log::debug!("client went away before response: {e}");
    }
}
