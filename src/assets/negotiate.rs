//! Content negotiation and conditional request handling.

use crate::assets::{AssetEntry, AssetVariant, Encoding};

/// Codings a client accepts, parsed from `accept-encoding`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptEncoding {
    brotli: bool,
    gzip: bool,
}

impl AcceptEncoding {
    /// Parse an `accept-encoding` value. Codings with `q=0` are refused;
    /// `*` accepts every coding not listed explicitly.
    pub fn parse(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Self::default();
        };

        let mut brotli = None;
        let mut gzip = None;
        let mut wildcard = None;

        for item in header.split(',') {
            let mut parts = item.split(';');
            let coding = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
            let accepted = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .filter_map(|q| q.trim().parse::<f32>().ok())
                .last()
                .map_or(true, |q| q > 0.0);

            match coding.as_str() {
                "br" => brotli = Some(accepted),
                "gzip" | "x-gzip" => gzip = Some(accepted),
                "*" => wildcard = Some(accepted),
                _ => {}
            }
        }

        let wildcard = wildcard.unwrap_or(false);
        Self {
            brotli: brotli.unwrap_or(wildcard),
            gzip: gzip.unwrap_or(wildcard),
        }
    }

    pub fn accepts(&self, encoding: Encoding) -> bool {
        match encoding {
            Encoding::Identity => true,
            Encoding::Gzip => self.gzip,
            Encoding::Brotli => self.brotli,
        }
    }
}

/// Pick brotli, then gzip, then identity.
pub fn select<'a>(entry: &'a AssetEntry, accept: AcceptEncoding) -> &'a AssetVariant {
    if accept.accepts(Encoding::Brotli) {
        if let Some(variant) = &entry.brotli {
            return variant;
        }
    }
    if accept.accepts(Encoding::Gzip) {
        if let Some(variant) = &entry.gzip {
            return variant;
        }
    }
    &entry.identity
}

/// Whether an `if-none-match` value matches `etag` under weak comparison.
pub fn not_modified(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    let opaque = strip_weak(etag);
    header.split(',').map(str::trim).any(|tag| tag == "*" || strip_weak(tag) == opaque)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}
