use std::collections::HashMap;

use tracing::debug;

use super::{normalize, Match, RouteNotFound, RouteTemplate};

/// Routes in registration order. The first route that matches wins.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: Vec<RouteTemplate<H>>,
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self { routes: vec![] }
    }

    pub fn add(&mut self, path: &str, method: impl Into<String>, handler: H) {
        self.routes.push(RouteTemplate::new(path, method, handler));
    }

    pub fn routes(&self) -> &[RouteTemplate<H>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn resolve(&self, path: &str, method: &str) -> Result<Match<'_, H>, RouteNotFound> {
        let path = normalize(path);
        let segments: Vec<&str> = path.split('/').collect();

        for template in &self.routes {
            // A template whose literal text equals the request path matches
            // without capturing anything, even if it declares variables.
            if template.path() == path && template.method() == method {
                debug!(template = template.path(), "match");
                return Ok(Match::new(template, HashMap::new()));
            }

            if !template.has_vars() {
                continue;
            }

            let Some(vars) = capture_vars(template, &segments) else {
                continue;
            };

            if template.method() == method {
                debug!(template = template.path(), ?vars, "match");
                return Ok(Match::new(template, vars));
            }
        }

        Err(RouteNotFound)
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks `segments` against `template`, collecting variable values. Returns
/// `None` when the shapes differ or the literal segments don't line up.
fn capture_vars<H>(
    template: &RouteTemplate<H>,
    segments: &[&str],
) -> Option<HashMap<String, String>> {
    if segments.len() != template.segments().len() {
        return None;
    }

    let mut vars = HashMap::new();
    let mut without_vars = Vec::with_capacity(segments.len());
    for (idx, segment) in segments.iter().enumerate() {
        match template.var_at(idx) {
            Some(name) => {
                vars.insert(name.to_owned(), (*segment).to_owned());
            }
            None => without_vars.push(*segment),
        }
    }

    if without_vars != template.without_vars() {
        return None;
    }
    Some(vars)
}
