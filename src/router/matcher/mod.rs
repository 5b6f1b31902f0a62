pub use table::RouteTable;
pub use template::RouteTemplate;

use std::collections::HashMap;

use thiserror::Error;

mod table;
mod template;

pub const NOT_FOUND_MESSAGE: &str = "Page not found";

/// A resolved route plus the values captured by its path variables.
#[derive(Debug)]
pub struct Match<'t, H> {
    pub template: &'t RouteTemplate<H>,
    pub vars: HashMap<String, String>,
}

impl<'t, H> Match<'t, H> {
    fn new(template: &'t RouteTemplate<H>, vars: HashMap<String, String>) -> Self {
        Self { template, vars }
    }

    pub fn handler(&self) -> &'t H {
        self.template.handler()
    }
}

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[error("{}", NOT_FOUND_MESSAGE)]
pub struct RouteNotFound;

impl RouteNotFound {
    pub fn status(&self) -> u16 {
        404
    }

    pub fn message(&self) -> &'static str {
        NOT_FOUND_MESSAGE
    }
}

/// Strips one leading `/` and, if more than one char remains, one trailing `/`.
pub fn normalize(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.len() > 1 {
        return path.strip_suffix('/').unwrap_or(path);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::{normalize, RouteNotFound, NOT_FOUND_MESSAGE};

    #[test]
    fn test_normalize() {
        let tests = [
            ("", ""),
            ("/", ""),
            ("//", "/"),
            ("///", "/"),
            ("a", "a"),
            ("/a", "a"),
            ("a/", "a"),
            ("/a/", "a"),
            ("/a//", "a/"),
            ("/{id}/contacts/", "{id}/contacts"),
            ("sample/{id}/contacts", "sample/{id}/contacts"),
        ];

        for (path, want) in tests {
            assert_eq!(normalize(path), want, "path: {:?}", path);
        }
    }

    #[test]
    fn test_normalize_idempotent() {
        let paths = [
            "", "/", "a", "/a", "a/", "/a/", "/a/b/", "a//b", "/{id}/", "x/y/z/", "/users/28",
        ];

        for path in paths {
            let once = normalize(path);
            assert_eq!(normalize(once), once, "path: {:?}", path);
        }
    }

    #[test]
    fn test_normalize_strips_one_slash_per_side() {
        // Doubled boundary slashes survive a single pass.
        assert_eq!(normalize("//a//"), "/a/");
        assert_eq!(normalize(normalize("//a//")), "a");
    }

    #[test]
    fn test_route_not_found() {
        let err = RouteNotFound;
        assert_eq!(err.status(), 404);
        assert_eq!(err.message(), NOT_FOUND_MESSAGE);
        assert_eq!(err.to_string(), "Page not found");
    }
}
