//! Scan-wide registry of element fingerprints
//!
//! The registry answers one question for the trainer: which of these freshly
//! parsed elements has this scan never seen before? Memory grows with the
//! number of distinct fingerprints, never with the number of calls.

use crate::elements::{Element, ElementKind, Fingerprint, Scope};
use std::collections::HashSet;

/// Elements that were new to the registry
#[derive(Debug, Clone)]
pub struct Delta<E> {
    pub elements: Vec<E>,
}

impl<E> Delta<E> {
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<E> Default for Delta<E> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

/// Fingerprint sets partitioned by element kind
#[derive(Debug, Default)]
pub struct ElementRegistry {
    cookies: HashSet<Fingerprint>,
    forms: HashSet<Fingerprint>,
    links: HashSet<Fingerprint>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, kind: ElementKind) -> &mut HashSet<Fingerprint> {
        match kind {
            ElementKind::Cookie => &mut self.cookies,
            ElementKind::Form => &mut self.forms,
            ElementKind::Link => &mut self.links,
        }
    }

    fn set(&self, kind: ElementKind) -> &HashSet<Fingerprint> {
        match kind {
            ElementKind::Cookie => &self.cookies,
            ElementKind::Form => &self.forms,
            ElementKind::Link => &self.links,
        }
    }

    /// Keep only unseen elements, recording them and claiming them for
    /// the page at `revealed_by`
    pub fn update<E: Element>(&mut self, fresh: Vec<E>, revealed_by: &str) -> Delta<E> {
        let seen = self.set_mut(E::KIND);

        let elements: Vec<E> = fresh
            .into_iter()
            .filter_map(|mut element| {
                if !seen.insert(element.fingerprint()) {
                    return None;
                }
                element.set_scope(Scope::Page(revealed_by.to_string()));
                Some(element)
            })
            .collect();

        if !elements.is_empty() {
            ::log::trace!(
                "Registry learned {} new {}(s) from {}",
                elements.len(),
                E::KIND,
                revealed_by
            );
        }
        Delta { elements }
    }

    /// Record elements as known without producing a delta
    pub fn register<'a, E: Element + 'a>(&mut self, known: impl IntoIterator<Item = &'a E>) {
        let seen = self.set_mut(E::KIND);
        for element in known {
            seen.insert(element.fingerprint());
        }
    }

    pub fn contains<E: Element>(&self, element: &E) -> bool {
        self.set(E::KIND).contains(&element.fingerprint())
    }

    /// Number of distinct fingerprints of one kind
    pub fn seen(&self, kind: ElementKind) -> usize {
        self.set(kind).len()
    }

    /// Number of distinct fingerprints across all kinds
    pub fn len(&self) -> usize {
        ElementKind::ALL.iter().map(|kind| self.seen(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Cookie, Form, FormInput};

    fn login_form(extra: &str) -> Form {
        let mut user = FormInput::new("user");
        user.value = Some(extra.to_string());
        Form::new("http://a/login", "POST")
            .with_input(user)
            .with_input(FormInput::new("pass"))
    }

    #[test]
    fn test_new_elements_are_claimed_by_revealing_page() {
        let mut registry = ElementRegistry::new();
        let delta = registry.update(vec![login_form("")], "http://a/home");

        assert_eq!(delta.count(), 1);
        assert_eq!(delta.elements[0].scope, Scope::Page("http://a/home".to_string()));
    }

    #[test]
    fn test_seen_elements_are_dropped() {
        let mut registry = ElementRegistry::new();
        registry.update(vec![login_form("a")], "http://a/one");

        let delta = registry.update(vec![login_form("b")], "http://a/two");
        assert!(delta.is_empty());
        assert_eq!(registry.seen(ElementKind::Form), 1);
    }

    #[test]
    fn test_duplicates_within_one_batch_emit_once() {
        let mut registry = ElementRegistry::new();
        let delta = registry.update(vec![login_form("a"), login_form("b")], "http://a/");
        assert_eq!(delta.count(), 1);
    }

    #[test]
    fn test_growth_is_bounded_by_distinct_fingerprints() {
        let mut registry = ElementRegistry::new();
        for i in 0..100 {
            registry.update(vec![Cookie::new("sid", &i.to_string())], "http://a/");
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_kinds_are_partitioned() {
        let mut registry = ElementRegistry::new();
        registry.update(vec![Cookie::new("login", "1")], "http://a/");

        // A form can share text with a cookie name without colliding
        let form = Form::new("login", "GET");
        assert!(!registry.contains(&form));
        assert_eq!(registry.seen(ElementKind::Cookie), 1);
        assert_eq!(registry.seen(ElementKind::Form), 0);
    }

    #[test]
    fn test_register_primes_without_delta() {
        let mut registry = ElementRegistry::new();
        let known = vec![login_form("")];
        registry.register(&known);

        assert!(registry.contains(&known[0]));
        assert!(registry.update(known, "http://a/").is_empty());
    }
}
