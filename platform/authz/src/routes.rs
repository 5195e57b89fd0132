use crate::RouteAccess;

/// How a rule's pattern matches a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    Exact(String),
    /// Matches the path itself and anything below it (`/a` covers `/a/b`, not `/ab`).
    Prefix(String),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(pattern) => pattern == path,
            PathMatch::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// `None` matches every method.
    pub method: Option<String>,
    pub path: PathMatch,
    pub access: RouteAccess,
}

impl RouteRule {
    fn matches(&self, method: &str, path: &str) -> bool {
        let method_ok = self
            .method
            .as_deref()
            .is_none_or(|m| m.eq_ignore_ascii_case(method));
        method_ok && self.path.matches(path)
    }
}

/// Ordered route classification; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: RouteAccess,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::empty()
            .exact(None, "/health", RouteAccess::Public)
            .exact(Some("POST"), "/login", RouteAccess::Public)
            .exact(None, "/login", RouteAccess::GuestOnly)
            .exact(None, "/forgot-password", RouteAccess::GuestOnly)
            .prefix(None, "/rh-users/management", RouteAccess::RhOrAdmin)
            .prefix(None, "/rh-users", RouteAccess::AdminOnly)
            .prefix(None, "/departments", RouteAccess::AdminOnly)
            .exact(None, "/", RouteAccess::Authenticated)
            .exact(None, "/home", RouteAccess::Authenticated)
            .exact(None, "/logout", RouteAccess::Authenticated)
    }
}

impl RouteTable {
    /// Table with no rules; everything falls back to `Authenticated`.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: RouteAccess::Authenticated,
        }
    }

    pub fn exact(mut self, method: Option<&str>, path: &str, access: RouteAccess) -> Self {
        self.rules.push(RouteRule {
            method: method.map(str::to_string),
            path: PathMatch::Exact(normalize(path)),
            access,
        });
        self
    }

    pub fn prefix(mut self, method: Option<&str>, path: &str, access: RouteAccess) -> Self {
        self.rules.push(RouteRule {
            method: method.map(str::to_string),
            path: PathMatch::Prefix(normalize(path)),
            access,
        });
        self
    }

    pub fn with_fallback(mut self, access: RouteAccess) -> Self {
        self.fallback = access;
        self
    }

    pub fn classify(&self, method: &str, path: &str) -> RouteAccess {
        let path = normalize(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(method, &path))
            .map(|rule| rule.access)
            .unwrap_or(self.fallback)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

/// Leading slash enforced, trailing slash dropped (except for the root).
fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let mut out = String::with_capacity(trimmed.len() + 1);
    if !trimmed.starts_with('/') {
        out.push('/');
    }
    out.push_str(trimmed);
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
