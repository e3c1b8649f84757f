use crate::config::{TrainerConfig, TrapConfig};
use crate::response::Response;
use regex::Regex;
use url::Url;

/// Stateless predicates deciding whether a URL or response is worth analyzing
#[derive(Debug)]
pub struct ScopeFilter {
    config: TrainerConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
    redundant_regexes: Vec<Regex>,
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self {
            config: TrainerConfig::default(),
            include_regexes: Vec::new(),
            exclude_regexes: Vec::new(),
            redundant_regexes: Vec::new(),
        }
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

impl ScopeFilter {
    /// Create a new filter from configuration
    pub fn new(config: &TrainerConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            include_regexes: compile(&config.include_patterns)?,
            exclude_regexes: compile(&config.exclude_patterns)?,
            redundant_regexes: compile(&config.redundant_patterns)?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Whether a URL is a crawler trap: a configured redundancy pattern or,
    /// when enabled, a trap heuristic
    pub fn is_redundant_path(&self, url: &Url) -> bool {
        let url_str = url.as_str();
        if let Some(regex) = self.redundant_regexes.iter().find(|r| r.is_match(url_str)) {
            ::log::debug!("{} matches redundancy pattern {}", url, regex.as_str());
            return true;
        }

        let traps = &self.config.trap_detection;
        if traps.enabled && is_crawl_trap(url, traps) {
            ::log::debug!("{} looks like a crawler trap", url);
            return true;
        }

        false
    }

    /// Whether a response matches an exclusion rule
    pub fn should_skip_resource(&self, response: &Response, url: &Url) -> bool {
        if !self.should_crawl(url) {
            return true;
        }

        if let Some(max) = self.config.max_body_size {
            if response.body.len() > max {
                ::log::debug!(
                    "{} body of {} bytes exceeds limit of {}",
                    url,
                    response.body.len(),
                    max
                );
                return true;
            }
        }

        if let Some(content_type) = response.content_type() {
            let matches = |list: &[String]| list.iter().any(|ct| content_type.starts_with(ct.as_str()));

            if matches(self.config.denied_content_types.as_slice()) {
                return true;
            }
            if !self.config.allowed_content_types.is_empty()
                && !matches(self.config.allowed_content_types.as_slice())
            {
                return true;
            }
        }

        false
    }

    /// Determine if a URL is in scope based on all URL-only rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        // Check domain restrictions
        if !self.is_in_domain_scope(url) {
            return false;
        }

        // Check path prefix
        if !self.is_in_path_scope(url) {
            return false;
        }

        if self.has_excluded_extension(url) {
            return false;
        }

        // Check regex exclusions (these take precedence)
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        // If include patterns are specified, at least one must match
        self.include_regexes.is_empty() || self.include_regexes.iter().any(|r| r.is_match(url_str))
    }

    /// Check if a URL is within the allowed domain scope
    fn is_in_domain_scope(&self, url: &Url) -> bool {
        if self.config.allow_external {
            return true;
        }

        match (&self.config.required_domain, url.domain()) {
            (Some(required), Some(domain)) => {
                domain == required || domain.ends_with(&format!(".{}", required))
            }
            // No domain in URL but domain required, or nothing to compare against
            _ => false,
        }
    }

    /// Check if a URL is within the required path scope
    fn is_in_path_scope(&self, url: &Url) -> bool {
        match &self.config.required_path_prefix {
            Some(prefix) => url.path().starts_with(prefix.as_str()),
            None => true,
        }
    }

    fn has_excluded_extension(&self, url: &Url) -> bool {
        let last = url.path_segments().and_then(|s| s.last()).unwrap_or_default();
        match last.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => self
                .config
                .excluded_extensions
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }

    /// Create a normalized version of the URL (e.g., removing fragments)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}

/// Detect if a URL is likely a crawl trap
pub fn is_crawl_trap(url: &Url, config: &TrapConfig) -> bool {
    if url.as_str().len() > config.max_url_length {
        return true;
    }

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();

    segments.len() > config.max_path_depth
        || has_repetitive_pattern(&segments, config.max_repeated_segments)
        || is_calendar_trap(&segments)
}

fn has_repetitive_pattern(segments: &[&str], max_repeats: usize) -> bool {
    if segments.len() < 4 {
        return false;
    }

    for window_size in 1..=segments.len() / 2 {
        let repeats = (0..segments.len() - window_size)
            .filter(|&i| segments[i] == segments[i + window_size])
            .count();
        if repeats >= max_repeats {
            return true;
        }
    }

    false
}

/// Three or more consecutive numeric segments, like `/2024/01/02`
fn is_calendar_trap(segments: &[&str]) -> bool {
    let mut consecutive_numbers = 0;
    for part in segments {
        if part.parse::<u32>().is_ok() {
            consecutive_numbers += 1;
            if consecutive_numbers >= 3 {
                return true;
            }
        } else {
            consecutive_numbers = 0;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_redundancy_patterns() {
        let config = TrainerConfig {
            redundant_patterns: vec![r"/calendar/.*".to_string()],
            ..TrainerConfig::default()
        };
        let filter = ScopeFilter::new(&config).unwrap();

        assert!(filter.is_redundant_path(&url("http://a/calendar/week")));
        assert!(!filter.is_redundant_path(&url("http://a/blog/post")));
    }

    #[test]
    fn test_trap_heuristics() {
        let mut config = TrainerConfig::default();
        config.trap_detection.enabled = true;
        let filter = ScopeFilter::new(&config).unwrap();

        assert!(filter.is_redundant_path(&url("https://example.com/events/2024/01/15")));
        assert!(filter.is_redundant_path(&url(
            "https://example.com/forum/thread/forum/thread/forum/thread/page"
        )));
        assert!(filter.is_redundant_path(&url(
            "https://example.com/a/b/c/d/e/f/g/h/i/j/k/l/m/n/o/p"
        )));
        assert!(!filter.is_redundant_path(&url("https://example.com/blog/2024/01")));
        assert!(!filter.is_redundant_path(&url("https://example.com/a/b/c")));
    }

    #[test]
    fn test_trap_heuristics_are_opt_in() {
        let filter = ScopeFilter::new(&TrainerConfig::default()).unwrap();

        assert!(!filter.is_redundant_path(&url("https://example.com/events/2024/01/15")));
        assert!(!filter.is_redundant_path(&url("https://example.com/product/1/2/3")));
    }

    #[test]
    fn test_domain_restriction() {
        let config = TrainerConfig {
            allow_external: false,
            required_domain: Some("example.com".to_string()),
            ..TrainerConfig::default()
        };
        let filter = ScopeFilter::new(&config).unwrap();

        assert!(filter.should_crawl(&url("https://example.com/page")));
        assert!(filter.should_crawl(&url("https://shop.example.com/page")));
        assert!(!filter.should_crawl(&url("https://other.com/page")));
        assert!(!filter.should_crawl(&url("https://notexample.com/page")));
    }

    #[test]
    fn test_path_restriction() {
        let config = TrainerConfig {
            required_path_prefix: Some("/docs".to_string()),
            ..TrainerConfig::default()
        };
        let filter = ScopeFilter::new(&config).unwrap();

        assert!(filter.should_crawl(&url("https://example.com/docs/page")));
        assert!(!filter.should_crawl(&url("https://example.com/blog/post")));
    }

    #[test]
    fn test_regex_patterns() {
        let config = TrainerConfig {
            include_patterns: vec![r"/docs/.*\.html$".to_string()],
            exclude_patterns: vec![r"/docs/draft/".to_string()],
            ..TrainerConfig::default()
        };
        let filter = ScopeFilter::new(&config).unwrap();

        assert!(filter.should_crawl(&url("https://example.com/docs/page.html")));
        assert!(!filter.should_crawl(&url("https://example.com/docs/page.txt")));
        assert!(!filter.should_crawl(&url("https://example.com/docs/draft/page.html")));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let config = TrainerConfig {
            redundant_patterns: vec!["(unclosed".to_string()],
            ..TrainerConfig::default()
        };
        assert!(ScopeFilter::new(&config).is_err());
    }

    #[test]
    fn test_skip_resource_rules() {
        let config = TrainerConfig {
            allowed_content_types: vec!["text/".to_string()],
            denied_content_types: vec!["text/css".to_string()],
            max_body_size: Some(10),
            ..TrainerConfig::default()
        };
        let filter = ScopeFilter::new(&config).unwrap();
        let page = url("http://a/page");

        let html = Response::new(page.as_str(), 200, "<p>hi</p>").with_header("Content-Type", "text/html");
        assert!(!filter.should_skip_resource(&html, &page));

        let css = Response::new(page.as_str(), 200, "a{}").with_header("Content-Type", "text/css");
        assert!(filter.should_skip_resource(&css, &page));

        let json = Response::new(page.as_str(), 200, "{}").with_header("Content-Type", "application/json");
        assert!(filter.should_skip_resource(&json, &page));

        let big = Response::new(page.as_str(), 200, "0123456789abc");
        assert!(filter.should_skip_resource(&big, &page));

        let image = url("http://a/logo.PNG");
        let response = Response::new(image.as_str(), 200, "");
        assert!(filter.should_skip_resource(&response, &image));
    }

    #[test]
    fn test_normalize_url() {
        let filter = ScopeFilter::default();
        let normalized = filter.normalize_url(&url("http://a/page?x=1#section"));
        assert_eq!(normalized.as_str(), "http://a/page?x=1");
    }
}
