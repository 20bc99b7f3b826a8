//! Route descriptor construction.
//!
//! # Responsibilities
//! - Derive the identifier, URL pattern and parameter names for a page file
//! - Compute the precedence key used to order dynamic routes
//! - Compute the module reference relative to the router module
//!
//! # Design Decisions
//! - Pure function of (file path, routes root, router directory)
//! - Any filename is accepted; pathological names collapse to `_`-prefixed identifiers
//! - `_name` marks a single-segment parameter, `__` escapes a literal underscore

use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::compiler::path::{absolutize, relative, strip_extension, to_route_token};

/// Compiled metadata for one page file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    /// Legal binding name derived from the route path.
    pub identifier: String,

    /// URL pattern with `:name` parameter markers, e.g. `/user/:id`.
    pub url_pattern: String,

    /// Anchored regex source, present only for dynamic routes.
    pub matcher: Option<String>,

    /// Parameter names in the order they appear in the pattern.
    pub param_names: Vec<String>,

    /// Per-segment precedence digits.
    pub precedence_key: PrecedenceKey,

    /// Import reference relative to the router module.
    pub module_path: String,

    /// True iff the pattern is exactly a 4xx/5xx status segment.
    pub is_error_route: bool,

    /// Source file relative to the routes root.
    pub file: String,
}

impl RouteDescriptor {
    /// Whether the pattern carries parameter markers.
    pub fn is_dynamic(&self) -> bool {
        self.url_pattern.contains(':')
    }

    /// The status code an error route is registered for.
    pub fn error_code(&self) -> Option<u16> {
        if self.is_error_route {
            self.url_pattern[1..].parse().ok()
        } else {
            None
        }
    }
}

/// Sort key built from one digit per `/`-delimited pattern segment.
///
/// Keys compare digit by digit; when one key is a prefix of the other the
/// shorter key ranks higher. Routes are ordered by this key descending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PrecedenceKey(String);

impl PrecedenceKey {
    /// Compute the key for a URL pattern.
    ///
    /// `9` for a literal segment, `8` for a segment whose first parameter
    /// marker is not at its start, otherwise the number of `:`-delimited
    /// parts in the segment.
    pub fn for_pattern(url_pattern: &str) -> Self {
        let key = url_pattern
            .split('/')
            .map(|segment| {
                if !segment.contains(':') {
                    9
                } else if !segment.starts_with(':') {
                    8
                } else {
                    // stays below the mixed and literal digits
                    segment.split(':').count().min(7)
                }
            })
            .map(|digit| char::from(b'0' + digit as u8))
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for PrecedenceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.0.as_bytes(), other.0.as_bytes());
        match a.iter().zip(b).map(|(x, y)| x.cmp(y)).find(|o| o.is_ne()) {
            Some(ordering) => ordering,
            // a shorter pattern outranks any longer pattern it prefixes
            None => b.len().cmp(&a.len()),
        }
    }
}

impl PartialOrd for PrecedenceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds descriptors for files under one routes root.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    routes_root: PathBuf,
    router_dir: PathBuf,
}

impl DescriptorBuilder {
    /// Create a builder for `routes_root`, with module references computed
    /// relative to the directory containing `router_module`.
    pub fn new(routes_root: &Path, router_module: &Path) -> Self {
        let router_module = absolutize(router_module);
        let router_dir = router_module
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(router_module);

        Self {
            routes_root: absolutize(routes_root),
            router_dir,
        }
    }

    pub fn routes_root(&self) -> &Path {
        &self.routes_root
    }

    /// Derive the descriptor for `file`, a path under the routes root.
    pub fn describe(&self, file: &Path) -> RouteDescriptor {
        let file = if file.is_absolute() {
            absolutize(file)
        } else {
            absolutize(&self.routes_root.join(file))
        };

        let without_ext = strip_extension(&file);
        let route_path = to_route_token(&relative(
            &self.routes_root,
            &strip_extension(&without_ext),
        ));

        let identifier = sanitize_identifier(&pascal_case(&route_path));
        let url_pattern = page_path(&route_path);
        let precedence_key = PrecedenceKey::for_pattern(&url_pattern);

        let mut param_names = Vec::new();
        let matcher = if url_pattern.contains(':') {
            Some(compile_pattern(&url_pattern, &mut param_names))
        } else {
            None
        };

        let is_error_route = matcher.is_none() && is_status_segment(&url_pattern);

        let mut module_path = to_route_token(&relative(&self.router_dir, &without_ext));
        if !module_path.starts_with('.') && !module_path.starts_with('/') {
            module_path = format!("./{}", module_path);
        }

        RouteDescriptor {
            identifier,
            url_pattern,
            matcher,
            param_names,
            precedence_key,
            module_path,
            is_error_route,
            file: to_route_token(&relative(&self.routes_root, &file)),
        }
    }
}

/// Fold index files and transliterate parameter markers.
fn page_path(route_path: &str) -> String {
    let folded = if route_path == "index" {
        ""
    } else if let Some(prefix) = route_path.strip_suffix("/index") {
        // keep the trailing slash
        &route_path[..prefix.len() + 1]
    } else {
        route_path
    };

    let mut out = String::with_capacity(folded.len() + 1);
    out.push('/');
    let mut rest = folded;
    while let Some(idx) = rest.find('_') {
        out.push_str(&rest[..idx]);
        if rest[idx..].starts_with("__") {
            out.push('_');
            rest = &rest[idx + 2..];
        } else {
            out.push(':');
            rest = &rest[idx + 1..];
        }
    }
    out.push_str(rest);
    out
}

/// Compile `:name` markers into an anchored regex, collecting the names.
fn compile_pattern(url_pattern: &str, param_names: &mut Vec<String>) -> String {
    let mut source = String::from("^");
    let mut literal_start = 0;
    let bytes = url_pattern.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b':' && bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            let end = bytes[i + 1..]
                .iter()
                .position(|b| !b.is_ascii_alphanumeric())
                .map_or(bytes.len(), |p| i + 1 + p);

            source.push_str(&regex::escape(&url_pattern[literal_start..i]));
            source.push_str("([^/]+?)");
            param_names.push(url_pattern[i + 1..end].to_string());
            literal_start = end;
            i = end;
        } else {
            i += 1;
        }
    }

    source.push_str(&regex::escape(&url_pattern[literal_start..]));
    source.push('$');
    source
}

fn is_status_segment(url_pattern: &str) -> bool {
    let bytes = url_pattern.as_bytes();
    bytes.len() == 4
        && bytes[0] == b'/'
        && matches!(bytes[1], b'4' | b'5')
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
}

/// Capitalized concatenation of the alphanumeric words in `input`.
fn pascal_case(input: &str) -> String {
    let mut out = String::new();
    for (i, word) in split_words(input).iter().enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i > 0 && first.is_ascii_digit() {
                out.push('_');
            }
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }
    out
}

fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Strip characters outside `[A-Za-z0-9_]` and guarantee a legal first character.
fn sanitize_identifier(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    match cleaned.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => cleaned,
        _ => format!("_{}", cleaned),
    }
}
