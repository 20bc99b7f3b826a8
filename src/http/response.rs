//! Response construction.
//!
//! # Responsibilities
//! - Build asset, document and plain-text responses
//! - Map invalid status codes and header values to a plain 500
//!
//! # Design Decisions
//! - Bodies are fully buffered; documents are assembled before any byte is sent
//! - Builders never panic: a response that cannot be built degrades to 500

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::assets::AssetVariant;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";
pub const STYLESHEET_CONTENT_TYPE: &str = "text/css";

/// `"<code> <reason phrase>"` as plain text.
pub fn plain_status(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let line = match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    };
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        line,
    )
        .into_response()
}

/// Rendered document with `code`.
pub fn html(code: u16, document: String) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE))],
            document,
        )
            .into_response(),
        Err(_) => plain_status(500),
    }
}

/// 200 with the variant's headers and body.
pub fn variant(variant: &AssetVariant) -> Response {
    let headers = &variant.headers;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CACHE_CONTROL, headers.cache_control.as_str())
        .header(header::CONTENT_ENCODING, headers.content_encoding.as_str())
        .header(header::CONTENT_LENGTH, headers.content_length)
        .header(header::CONTENT_TYPE, headers.content_type)
        .header(header::ETAG, headers.etag.as_str())
        .header(header::VARY, "accept-encoding")
        .body(Body::from(variant.body.clone()))
        .unwrap_or_else(|_| plain_status(500))
}

/// 304 for the variant the client already holds.
pub fn not_modified(variant: &AssetVariant) -> Response {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::CACHE_CONTROL, variant.headers.cache_control.as_str())
        .header(header::ETAG, variant.headers.etag.as_str())
        .body(Body::empty())
        .unwrap_or_else(|_| plain_status(500))
}

/// Raw build output with a minimal content type.
pub fn raw_file(content_type: &'static str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        Bytes::from(bytes),
    )
        .into_response()
}
