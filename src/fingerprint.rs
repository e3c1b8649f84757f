//! Platform fingerprinting of emitted pages

use crate::error::TrainError;
use crate::page::Page;
use regex::RegexSet;
use std::collections::BTreeSet;

/// Identifies server-side platforms from a page
pub trait Fingerprinter: Send {
    fn fingerprint(&self, page: &Page) -> Result<Vec<String>, TrainError>;
}

/// Body patterns per platform
const BODY_PATTERNS: &[(&str, &str)] = &[
    ("wordpress", r"(?i)wp-content|wp-includes"),
    ("drupal", r"(?i)sites/default/files|drupal-settings-json"),
    ("joomla", r"(?i)/media/jui/|com_content"),
    ("django", r"csrfmiddlewaretoken"),
    ("rails", r#"(?i)name="csrf-param""#),
    ("aspx", r"__VIEWSTATE"),
];

/// Session cookie names per platform
const COOKIE_NAMES: &[(&str, &str)] = &[
    ("PHPSESSID", "php"),
    ("JSESSIONID", "java"),
    ("ASP.NET_SessionId", "aspx"),
    ("ASPSESSIONID", "asp"),
    ("CFID", "coldfusion"),
    ("laravel_session", "laravel"),
];

/// Path extensions per platform
const EXTENSIONS: &[(&str, &str)] = &[
    ("php", "php"),
    ("jsp", "java"),
    ("do", "java"),
    ("aspx", "aspx"),
    ("asp", "asp"),
    ("cfm", "coldfusion"),
    ("pl", "perl"),
    ("py", "python"),
];

/// Fingerprints from headers, cookies, URL extension and body markers
#[derive(Debug)]
pub struct HeaderFingerprinter {
    body_patterns: RegexSet,
}

impl HeaderFingerprinter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            body_patterns: RegexSet::new(BODY_PATTERNS.iter().map(|(_, p)| *p))?,
        })
    }

    fn from_headers(page: &Page, found: &mut BTreeSet<String>) {
        for (name, value) in &page.headers {
            let value = value.to_ascii_lowercase();
            if name.eq_ignore_ascii_case("server") {
                for server in ["apache", "nginx", "iis", "tomcat", "jetty", "lighttpd"] {
                    if value.contains(server) {
                        found.insert(server.to_string());
                    }
                }
            } else if name.eq_ignore_ascii_case("x-powered-by") {
                for (marker, platform) in [
                    ("php", "php"),
                    ("asp.net", "aspx"),
                    ("express", "nodejs"),
                    ("servlet", "java"),
                ] {
                    if value.contains(marker) {
                        found.insert(platform.to_string());
                    }
                }
            } else if name.eq_ignore_ascii_case("x-aspnet-version") {
                found.insert("aspx".to_string());
            }
        }
    }
}

impl Fingerprinter for HeaderFingerprinter {
    fn fingerprint(&self, page: &Page) -> Result<Vec<String>, TrainError> {
        let url = url::Url::parse(&page.url).map_err(|e| TrainError::Fingerprint {
            url: page.url.clone(),
            reason: e.to_string(),
        })?;

        let mut found = BTreeSet::new();
        Self::from_headers(page, &mut found);

        for cookie in &page.cookies {
            if let Some((_, platform)) = COOKIE_NAMES
                .iter()
                .find(|(name, _)| cookie.name.starts_with(name))
            {
                found.insert(platform.to_string());
            }
        }

        let last = url.path_segments().and_then(|s| s.last()).unwrap_or_default();
        if let Some((_, ext)) = last.rsplit_once('.') {
            let ext = ext.to_ascii_lowercase();
            if let Some((_, platform)) = EXTENSIONS.iter().find(|(e, _)| *e == ext) {
                found.insert(platform.to_string());
            }
        }

        for index in self.body_patterns.matches(&page.body).into_iter() {
            found.insert(BODY_PATTERNS[index].0.to_string());
        }

        Ok(found.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Cookie;

    #[test]
    fn test_detects_from_every_source() {
        let mut page = Page::new("http://a/index.php?id=1")
            .with_body(r#"<link href="/wp-content/themes/x.css">"#);
        page.headers = vec![
            ("Server".to_string(), "Apache/2.4.41 (Ubuntu)".to_string()),
            ("X-Powered-By".to_string(), "Express".to_string()),
        ];
        page.cookies = vec![Cookie::new("JSESSIONID", "abc")];

        let platforms = HeaderFingerprinter::new().unwrap().fingerprint(&page).unwrap();
        assert_eq!(
            platforms,
            vec!["apache", "java", "nodejs", "php", "wordpress"]
        );
    }

    #[test]
    fn test_plain_page_has_no_platforms() {
        let page = Page::new("http://a/about").with_body("<p>About us</p>");
        let platforms = HeaderFingerprinter::new().unwrap().fingerprint(&page).unwrap();
        assert!(platforms.is_empty());
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let page = Page::new("::nope::");
        assert!(HeaderFingerprinter::new().unwrap().fingerprint(&page).is_err());
    }
}
