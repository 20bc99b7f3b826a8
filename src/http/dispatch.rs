//! Per-request dispatch.
//!
//! Evaluated in order, first terminal branch wins:
//!
//! ```text
//! malformed target            → error path (404)
//! asset table hit             → negotiated variant, or 304
//! *.js / *.css (development)  → raw file from the build output
//! server route match          → head + body rendered concurrently, spliced
//! no match                    → error path (404)
//! error path                  → error route for the code, else "<code> <reason>"
//! anything failing above      → plain 500
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Request, Uri},
    response::Response,
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Component, Path};
use std::time::Instant;
use url::Url;

use crate::assets::{self, AcceptEncoding, AssetEntry};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics::{self, Outcome};
use crate::render::{
    assemble_document, render_guarded, Params, RenderContext, RenderError, HYDRATION_SCRIPT,
};
use crate::routing::RouteSnapshot;

type Dispatched = (Outcome, Response);

/// Catch-all handler.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        "Dispatching request"
    );

    let (outcome, response) =
        match AssertUnwindSafe(respond(&state, request.uri(), request.headers()))
            .catch_unwind()
            .await
        {
            Ok(dispatched) => dispatched,
            Err(_) => {
                tracing::error!(request_id = %request_id, "Dispatch panicked");
                (Outcome::Plain, response::plain_status(500))
            }
        };

    tracing::debug!(
        request_id = %request_id,
        outcome = outcome.as_str(),
        status = response.status().as_u16(),
        "Request complete"
    );
    metrics::record_request(outcome, response.status().as_u16(), start);
    response
}

async fn respond(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Dispatched {
    let snapshot = state.snapshots.load();

    let Some(path) = request_path(uri) else {
        return send_error(&snapshot, &state.base_url, 404).await;
    };

    if let Some(entry) = state.assets.get(path) {
        return serve_asset(entry, headers);
    }

    if !state.mode.is_production() {
        if let Some(content_type) = passthrough_type(path) {
            return match read_build_output(&state.out_dir, path).await {
                Ok(bytes) => (Outcome::Passthrough, response::raw_file(content_type, bytes)),
                Err(code) => send_error(&snapshot, &state.base_url, code).await,
            };
        }
    }

    let Ok(url) = Url::parse(&format!("{}{}", state.origin, path)) else {
        return send_error(&snapshot, &state.base_url, 404).await;
    };

    match render_document(&snapshot, &url).await {
        Ok(Some(document)) => (Outcome::Render, response::html(200, document)),
        Ok(None) => send_error(&snapshot, &url, 404).await,
        Err(RenderError::Status(code)) => send_error(&snapshot, &url, code).await,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "Render failed");
            send_error(&snapshot, &url, 500).await
        }
    }
}

/// Path of an origin-form target without a query, or `None` when malformed.
fn request_path(uri: &Uri) -> Option<&str> {
    if uri.scheme().is_some() || uri.query().is_some() {
        return None;
    }
    let path = uri.path();
    path.starts_with('/').then_some(path)
}

fn serve_asset(entry: &AssetEntry, headers: &HeaderMap) -> Dispatched {
    let accept = AcceptEncoding::parse(header_str(headers, header::ACCEPT_ENCODING));
    let variant = assets::select(entry, accept);

    if assets::not_modified(header_str(headers, header::IF_NONE_MATCH), variant.etag()) {
        (Outcome::NotModified, response::not_modified(variant))
    } else {
        (Outcome::Asset, response::variant(variant))
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn passthrough_type(path: &str) -> Option<&'static str> {
    if path.ends_with(".js") {
        Some(response::SCRIPT_CONTENT_TYPE)
    } else if path.ends_with(".css") {
        Some(response::STYLESHEET_CONTENT_TYPE)
    } else {
        None
    }
}

/// Read `path` under the build output. Errors carry the status to report.
async fn read_build_output(out_dir: &Path, path: &str) -> Result<Vec<u8>, u16> {
    let relative = Path::new(path.trim_start_matches('/'));
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(404);
    }

    let file = out_dir.join(relative);
    tokio::fs::read(&file).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            404
        } else {
            tracing::error!(file = ?file, error = %e, "Failed to read build output");
            500
        }
    })
}

/// Server tree renders the document shell, client tree the body.
/// `Ok(None)` when no server route matches.
async fn render_document(snapshot: &RouteSnapshot, url: &Url) -> Result<Option<String>, RenderError> {
    let Some(matched) = snapshot.server.resolve(url) else {
        return Ok(None);
    };
    let ctx = RenderContext::new(url.clone(), matched.params);

    let (head, body) = tokio::join!(
        render_guarded(matched.entry.as_ref(), &ctx),
        snapshot.client.render(url),
    );

    let head = head?;
    let mut body = body.transpose()?.unwrap_or_default();
    body.push_str(HYDRATION_SCRIPT);

    assemble_document(&head, &body).map(Some)
}

/// Render the error route for `code`, or fall back to a status line.
async fn send_error(snapshot: &RouteSnapshot, url: &Url, code: u16) -> Dispatched {
    let Some(page) = snapshot.server.error_page(code) else {
        return (Outcome::Plain, response::plain_status(code));
    };

    let ctx = RenderContext::new(url.clone(), Params::new());
    match render_guarded(page.as_ref(), &ctx).await {
        Ok(document) => (Outcome::ErrorRoute, response::html(code, document)),
        Err(e) => {
            tracing::error!(code, error = %e, "Error route failed to render");
            (Outcome::Plain, response::plain_status(500))
        }
    }
}
