use super::{Element, ElementKind, Fingerprint, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// A hyperlink, split into its location and query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL without query or fragment
    pub url: String,

    /// Query parameters by name
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    #[serde(default)]
    pub scope: Scope,
}

impl Link {
    pub fn from_url(url: &Url) -> Self {
        let params = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut bare = url.clone();
        bare.set_query(None);
        bare.set_fragment(None);

        Self {
            url: bare.to_string(),
            params,
            scope: Scope::default(),
        }
    }

    /// The link with its query string restored
    pub fn full_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) if !self.params.is_empty() => {
                url.query_pairs_mut().extend_pairs(self.params.iter());
                url.to_string()
            }
            _ => self.url.clone(),
        }
    }
}

impl Element for Link {
    const KIND: ElementKind = ElementKind::Link;

    fn fingerprint(&self) -> Fingerprint {
        let names = self.params.keys().map(String::as_str);
        Fingerprint::new(std::iter::once(self.url.as_str()).chain(names))
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_splits_query() {
        let url = Url::parse("http://a/items?id=3&sort=asc#top").unwrap();
        let link = Link::from_url(&url);

        assert_eq!(link.url, "http://a/items");
        assert_eq!(link.params.get("id").map(String::as_str), Some("3"));
        assert_eq!(link.full_url(), "http://a/items?id=3&sort=asc");
    }

    #[test]
    fn test_fingerprint_uses_param_names_only() {
        let a = Link::from_url(&Url::parse("http://a/items?id=3&sort=asc").unwrap());
        let b = Link::from_url(&Url::parse("http://a/items?sort=desc&id=9").unwrap());
        let c = Link::from_url(&Url::parse("http://a/items?id=3").unwrap());

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
