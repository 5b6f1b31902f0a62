use tracing::info;

use crate::{
    request::Request,
    response_writer::ResponseWriter,
    server::{Handler, HttpMethod},
};

use matcher::{RouteNotFound, RouteTable};

pub mod matcher;

/// Dispatches requests below an optional mount prefix to the first matching route.
pub struct Router {
    prefix: Option<String>,
    table: RouteTable<Box<dyn Handler + Sync>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            prefix: None,
            table: RouteTable::new(),
        }
    }

    /// Only requests below `prefix` are routed; the prefix is cut off before matching.
    /// `users`, `/users` and `/users/` mount at the same place.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/');
        Self {
            prefix: (!prefix.is_empty()).then(|| format!("/{}", prefix)),
            table: RouteTable::new(),
        }
    }

    pub fn add_route(
        &mut self,
        http_method: HttpMethod,
        pattern: &str,
        handler: impl Handler + Sync + 'static,
    ) {
        self.table
            .add(pattern, http_method.to_string(), Box::new(handler));
    }

    /// The part of `path` the route table sees: the prefix is cut at a segment
    /// boundary, then one trailing `/` is dropped.
    fn strip_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = match &self.prefix {
            Some(prefix) => path.strip_prefix(prefix.as_str())?,
            None => path,
        };
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        Some(rest.strip_suffix('/').unwrap_or(rest))
    }

    pub fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        let resolved = self
            .strip_prefix(r.get_path())
            .ok_or(RouteNotFound)
            .and_then(|path| self.table.resolve(path, r.get_http_method()));

        match resolved {
            Ok(m) => {
                r.set_vars(m.vars);
                m.template.handler().handle(w, r);
            }
            Err(err) => {
                info!(path = r.get_path(), method = r.get_http_method(), "no route");
                w.failure_reply(err.status(), err.message(), r);
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for Router {
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        self.handle(w, r);
    }
}
