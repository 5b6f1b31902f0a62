use super::normalize;

/// A compiled route: the normalized template, its method and where its
/// variables sit among the `/`-separated segments.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RouteTemplate<H> {
    path: String,
    method: String,
    segments: Vec<String>,
    var_indexes: Vec<usize>,
    var_names: Vec<String>,
    without_vars: Vec<String>,
    handler: H,
}

impl<H> RouteTemplate<H> {
    pub fn new(path: &str, method: impl Into<String>, handler: H) -> Self {
        let path = normalize(path).to_owned();

        let mut template = Self {
            path,
            method: method.into(),
            segments: vec![],
            var_indexes: vec![],
            var_names: vec![],
            without_vars: vec![],
            handler,
        };

        // The root route carries no segment metadata at all.
        if template.path.is_empty() {
            return template;
        }

        template.segments = template.path.split('/').map(str::to_owned).collect();
        for (idx, segment) in template.segments.iter().enumerate() {
            if segment.is_empty() {
                continue;
            }
            match var_name(segment) {
                Some(name) => {
                    template.var_indexes.push(idx);
                    template.var_names.push(name.to_owned());
                }
                None => template.without_vars.push(segment.clone()),
            }
        }
        template
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn var_indexes(&self) -> &[usize] {
        &self.var_indexes
    }

    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    pub fn without_vars(&self) -> &[String] {
        &self.without_vars
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn has_vars(&self) -> bool {
        !self.var_names.is_empty()
    }

    /// Name of the variable declared at segment `idx`, if any.
    pub fn var_at(&self, idx: usize) -> Option<&str> {
        self.var_indexes
            .iter()
            .position(|&var_idx| var_idx == idx)
            .map(|pos| self.var_names[pos].as_str())
    }
}

/// `{name}` -> `name`. The name may be empty; braces are not escaped or nested.
fn var_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
