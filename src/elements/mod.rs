//! Auditable elements discovered in responses
//!
//! Every element has a structural [`Fingerprint`] that ignores payload
//! values, so two forms with the same action, method and input names are the
//! same element no matter what their default values are.

pub mod cookie;
pub mod form;
pub mod link;

pub use cookie::Cookie;
pub use form::{Form, FormInput};
pub use link::Link;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of element the registry partitions by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Cookie,
    Form,
    Link,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [ElementKind::Cookie, ElementKind::Form, ElementKind::Link];
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Cookie => "cookie",
            ElementKind::Form => "form",
            ElementKind::Link => "link",
        };
        f.write_str(name)
    }
}

/// Probing eligibility of an element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scope {
    /// Freshly parsed, not yet claimed by any page
    #[default]
    Unassigned,
    /// Belongs to the page at this URL, which revealed it
    Page(String),
}

/// Structural identity of an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Vec<String>);

impl Fingerprint {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Behaviour shared by cookies, forms and links
pub trait Element: Clone + fmt::Debug {
    /// Registry partition this element type lives in
    const KIND: ElementKind;

    fn fingerprint(&self) -> Fingerprint;

    fn scope(&self) -> &Scope;

    fn set_scope(&mut self, scope: Scope);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_parts_do_not_bleed() {
        // Joining naively would make these collide
        let a = Fingerprint::new(["a b", "c"]);
        let b = Fingerprint::new(["a", "b c"]);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_kind_display() {
        let names: Vec<String> = ElementKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["cookie", "form", "link"]);
    }
}
