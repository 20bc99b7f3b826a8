//! Route matching logic.
//!
//! # Responsibilities
//! - Exact lookup of static pathnames
//! - Ordered scan of compiled dynamic patterns
//! - Positional binding of captures to parameter names
//!
//! # Design Decisions
//! - Static lookup always runs first; a static hit never reaches the dynamic list
//! - First match wins, no backtracking across entries
//! - Generic over the entry payload so the compiler and the server share one matcher

use regex::Regex;
use std::collections::{BTreeMap, HashMap};

/// Parameter values bound by a dynamic match, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A dynamic route: compiled pattern, its parameter names, and the payload.
#[derive(Debug, Clone)]
pub struct DynamicRoute<E> {
    pub pattern: Regex,
    pub param_names: Vec<String>,
    pub entry: E,
}

/// Result of a successful match.
#[derive(Debug)]
pub struct Match<'a, E> {
    pub entry: &'a E,
    pub params: Params,
}

/// Static, dynamic and error lookup structures for one route tree.
#[derive(Debug, Clone)]
pub struct RouteTable<E> {
    pub static_routes: HashMap<String, E>,
    pub dynamic_routes: Vec<DynamicRoute<E>>,
    pub error_routes: HashMap<u16, E>,
}

impl<E> Default for RouteTable<E> {
    fn default() -> Self {
        Self {
            static_routes: HashMap::new(),
            dynamic_routes: Vec::new(),
            error_routes: HashMap::new(),
        }
    }
}

impl<E> RouteTable<E> {
    /// Resolve `pathname` to an entry and its bound parameters.
    pub fn match_path(&self, pathname: &str) -> Option<Match<'_, E>> {
        if let Some(entry) = self.static_routes.get(pathname) {
            return Some(Match {
                entry,
                params: Params::new(),
            });
        }

        self.dynamic_routes.iter().find_map(|route| {
            let captures = route.pattern.captures(pathname)?;
            let params = route
                .param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    captures
                        .get(i + 1)
                        .map(|m| (name.as_str(), m.as_str()))
                })
                .collect();
            Some(Match {
                entry: &route.entry,
                params,
            })
        })
    }

    /// Entry registered for an error status code.
    pub fn error_route(&self, code: u16) -> Option<&E> {
        self.error_routes.get(&code)
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.static_routes.len() + self.dynamic_routes.len() + self.error_routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every payload, keeping patterns and order.
    pub fn map<F, T>(self, mut f: F) -> RouteTable<T>
    where
        F: FnMut(E) -> T,
    {
        RouteTable {
            static_routes: self
                .static_routes
                .into_iter()
                .map(|(k, v)| (k, f(v)))
                .collect(),
            dynamic_routes: self
                .dynamic_routes
                .into_iter()
                .map(|r| DynamicRoute {
                    pattern: r.pattern,
                    param_names: r.param_names,
                    entry: f(r.entry),
                })
                .collect(),
            error_routes: self
                .error_routes
                .into_iter()
                .map(|(k, v)| (k, f(v)))
                .collect(),
        }
    }
}
