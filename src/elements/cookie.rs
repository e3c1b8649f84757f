use super::{Element, ElementKind, Fingerprint, Scope};
use serde::{Deserialize, Serialize};

/// A cookie set by the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,

    pub value: String,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub http_only: bool,

    #[serde(default)]
    pub scope: Scope,
}

impl Cookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            scope: Scope::default(),
        }
    }
}

impl Element for Cookie {
    const KIND: ElementKind = ElementKind::Cookie;

    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new([self.name.as_str()])
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }
}
