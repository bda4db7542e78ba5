//! Request routing and path matching.
//!
//! Routes map a method and a path template to a caller-chosen route value.
//! Templates use `{name}` segments for parameters; captured values are
//! percent-decoded. Routes are checked in
//! registration order and the first match wins, so register literal paths
//! (`/contacts/new`) before parameterised ones (`/contacts/{id}`).
//!
//! # Example
//!
//! ```rust
//! use rolodex_server::router::{RouteResult, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/contacts/{id}/edit", "edit");
//! router.add_route(Method::DELETE, "/contacts/{id}", "delete");
//!
//! match router.match_route(&Method::GET, "/contacts/7/edit") {
//!     RouteResult::Matched(m) => {
//!         assert_eq!(*m.route(), "edit");
//!         assert_eq!(m.param("id"), Some("7"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! assert!(matches!(
//!     router.match_route(&Method::PUT, "/contacts/7"),
//!     RouteResult::MethodNotAllowed { .. }
//! ));
//! ```

use http::Method;
use std::collections::HashMap;

/// A matched route with extracted path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<T> {
    route: T,
    params: HashMap<String, String>,
}

impl<T> RouteMatch<T> {
    /// Returns the matched route value.
    #[must_use]
    pub fn route(&self) -> &T {
        &self.route
    }

    /// Returns all extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns one path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Splits the match into its route and parameters.
    #[must_use]
    pub fn into_parts(self) -> (T, HashMap<String, String>) {
        (self.route, self.params)
    }
}

/// Outcome of matching a request against the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult<T> {
    /// A route matched both path and method.
    Matched(RouteMatch<T>),
    /// The path is known but not for this method.
    MethodNotAllowed {
        /// Methods registered for the path, in registration order.
        allowed: Vec<Method>,
    },
    /// No route has this path.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Entry<T> {
    method: Method,
    segments: Vec<PathSegment>,
    route: T,
}

impl<T> Entry<T> {
    fn new(method: Method, pattern: &str, route: T) -> Self {
        Self {
            method,
            segments: parse_segments(pattern),
            route,
        }
    }

    fn match_path(&self, path_segments: &[&str]) -> Option<HashMap<String, String>> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                // Not valid UTF-8 once decoded: no match.
                PathSegment::Param(name) => {
                    let value = urlencoding::decode(actual).ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }
}

fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => PathSegment::Param(name.to_string()),
            None => PathSegment::Literal(s.to_string()),
        })
        .collect()
}

/// HTTP request router.
#[derive(Debug, Clone)]
pub struct Router<T> {
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `route` for `method` on `pattern`.
    pub fn add_route(&mut self, method: Method, pattern: impl AsRef<str>, route: T) {
        self.entries
            .push(Entry::new(method, pattern.as_ref(), route));
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.entries.len()
    }

    /// Matches a request method and path (without query string).
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteResult<T> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut allowed = Vec::new();

        for entry in &self.entries {
            let Some(params) = entry.match_path(&path_segments) else {
                continue;
            };
            if entry.method == *method {
                return RouteResult::Matched(RouteMatch {
                    route: entry.route.clone(),
                    params,
                });
            }
            if !allowed.contains(&entry.method) {
                allowed.push(entry.method.clone());
            }
        }

        if allowed.is_empty() {
            RouteResult::NotFound
        } else {
            RouteResult::MethodNotAllowed { allowed }
        }
    }
}

impl<T: Clone> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}
