use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for the trainer and its filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Maximum number of successful trainings per URL
    #[serde(default = "default_max_trainings_per_url")]
    pub max_trainings_per_url: usize,

    /// Redirect hops chased on behalf of one pushed response
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Base for resolving redirects before any seed page is installed
    #[serde(default)]
    pub entry_url: Option<String>,

    /// Regex patterns for URLs that are crawler traps
    #[serde(default)]
    pub redundant_patterns: Vec<String>,

    /// Heuristic trap detection on top of `redundant_patterns`, off by default
    #[serde(default)]
    pub trap_detection: TrapConfig,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Whether to train on responses outside `required_domain`
    #[serde(default = "default_allow_external")]
    pub allow_external: bool,

    /// Domain restriction, enforced when `allow_external` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_domain: Option<String>,

    /// Path prefix restriction (if None, all paths are allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_path_prefix: Option<String>,

    /// Media types worth analyzing (if empty, any textual type is)
    #[serde(default)]
    pub allowed_content_types: Vec<String>,

    /// Media types never analyzed
    #[serde(default)]
    pub denied_content_types: Vec<String>,

    /// File extensions never analyzed, without the leading dot
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Largest body, in bytes, worth analyzing
    #[serde(default)]
    pub max_body_size: Option<usize>,

    /// Run platform fingerprinting on emitted pages
    #[serde(default)]
    pub fingerprint: bool,
}

/// Thresholds for heuristic crawler-trap detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrapConfig {
    #[serde(default = "default_trap_detection")]
    pub enabled: bool,

    /// Maximum URL path depth (number of segments)
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,

    /// Maximum URL length in characters
    #[serde(default = "default_max_url_length")]
    pub max_url_length: usize,

    /// Maximum number of repeated path segments
    #[serde(default = "default_max_repeated_segments")]
    pub max_repeated_segments: usize,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            enabled: default_trap_detection(),
            max_path_depth: default_max_path_depth(),
            max_url_length: default_max_url_length(),
            max_repeated_segments: default_max_repeated_segments(),
        }
    }
}

impl TrainerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            max_trainings_per_url: default_max_trainings_per_url(),
            max_redirects: default_max_redirects(),
            entry_url: None,
            redundant_patterns: Vec::new(),
            trap_detection: TrapConfig::default(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            allow_external: default_allow_external(),
            required_domain: None,
            required_path_prefix: None,
            allowed_content_types: Vec::new(),
            denied_content_types: Vec::new(),
            excluded_extensions: default_excluded_extensions(),
            max_body_size: None,
            fingerprint: false,
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Restrict training to the domain of `start_url`
    pub fn scoped_to(mut self, start_url: &str) -> Self {
        if let Ok(url) = url::Url::parse(start_url) {
            self.allow_external = false;
            self.required_domain = url.domain().map(|d| d.to_string());
            self.entry_url = Some(url.to_string());
        }
        self
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Default value for max_trainings_per_url
fn default_max_trainings_per_url() -> usize {
    25
}

fn default_max_redirects() -> usize {
    10
}

fn default_allow_external() -> bool {
    true
}

fn default_excluded_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "png", "gif", "ico", "svg", "woff", "woff2", "ttf", "eot", "pdf", "zip",
        "gz", "tar", "mp3", "mp4", "avi",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

fn default_trap_detection() -> bool {
    false
}

fn default_max_path_depth() -> usize {
    15
}

fn default_max_url_length() -> usize {
    2048
}

fn default_max_repeated_segments() -> usize {
    3
}
