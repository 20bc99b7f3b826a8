//! Encoded representations of one asset.

use axum::body::Bytes;
use brotli::enc::backward_references::{BrotliEncoderMode, BrotliEncoderParams};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Content coding of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Identity,
    Gzip,
    Brotli,
}

impl Encoding {
    /// Token used in `content-encoding` and `accept-encoding`.
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Identity => "identity",
            Encoding::Gzip => "gzip",
            Encoding::Brotli => "br",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of build artifact an asset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Script chunk.
    Chunk,
    Stylesheet,
    /// Opaque bytes (fonts, images); never compressed.
    Binary,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js") | Some("mjs") => AssetKind::Chunk,
            Some("css") => AssetKind::Stylesheet,
            _ => AssetKind::Binary,
        }
    }

    /// Whether gzip and brotli variants are produced.
    pub fn is_text(self) -> bool {
        !matches!(self, AssetKind::Binary)
    }

    pub fn content_type(self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "text/css",
            _ => "application/javascript; charset=utf-8",
        }
    }
}

/// Response headers carried by a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantHeaders {
    pub cache_control: String,
    pub content_encoding: Encoding,
    pub content_length: usize,
    pub content_type: &'static str,
    /// Weak validator over this variant's own bytes.
    pub etag: String,
}

/// One encoded representation of an asset.
#[derive(Debug, Clone)]
pub struct AssetVariant {
    pub encoding: Encoding,
    pub headers: VariantHeaders,
    pub body: Bytes,
}

impl AssetVariant {
    pub fn new(encoding: Encoding, body: Vec<u8>, kind: AssetKind, cache_control: &str) -> Self {
        let headers = VariantHeaders {
            cache_control: cache_control.to_string(),
            content_encoding: encoding,
            content_length: body.len(),
            content_type: kind.content_type(),
            etag: weak_etag(&body),
        };
        Self {
            encoding,
            headers,
            body: Bytes::from(body),
        }
    }

    pub fn etag(&self) -> &str {
        &self.headers.etag
    }
}

/// `W/"<sha256 hex>"` over `bytes`.
pub fn weak_etag(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("W/\"{}\"", hex::encode(hasher.finalize()))
}

/// Brotli at maximum quality in text mode.
pub fn encode_brotli(input: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut params = BrotliEncoderParams::default();
    params.quality = 11;
    params.mode = BrotliEncoderMode::BROTLI_MODE_TEXT;
    params.size_hint = input.len();

    let mut output = Vec::new();
    brotli::BrotliCompress(&mut &input[..], &mut output, &params)?;
    Ok(output)
}

pub fn encode_gzip(input: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(input)?;
    encoder.finish()
}
