use crate::elements::{Cookie, Form, Link};
use crate::parsers::ParsedResponse;
use crate::response::Response;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Thread-safe summary of a parsed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Title of the page (if available)
    #[serde(default)]
    pub title: Option<String>,

    /// Whitespace-normalized body text
    #[serde(default)]
    pub text: String,
}

/// A page under audit, or a page emitted to the frontier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,

    /// Query variables of `url`
    #[serde(default)]
    pub query_vars: BTreeMap<String, String>,

    #[serde(default = "default_code")]
    pub code: u16,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub headers: Vec<(String, String)>,

    #[serde(default)]
    pub document: Document,

    #[serde(default)]
    pub forms: Vec<Form>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub cookies: Vec<Cookie>,

    /// Platforms identified by fingerprinting
    #[serde(default)]
    pub platforms: Vec<String>,
}

fn default_code() -> u16 {
    200
}

fn default_method() -> String {
    "GET".to_string()
}

impl Page {
    /// Create an empty `GET` page for a URL
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            query_vars: BTreeMap::new(),
            code: default_code(),
            method: default_method(),
            body: String::new(),
            headers: Vec::new(),
            document: Document::default(),
            forms: Vec::new(),
            links: Vec::new(),
            cookies: Vec::new(),
            platforms: Vec::new(),
        }
    }

    /// Build a full page from a response and its parse result
    pub fn from_response(response: &Response, parsed: ParsedResponse) -> Self {
        let mut page = Self::new(&parsed.url);
        page.refresh_from(response, &parsed);
        page.forms = parsed.forms;
        page.links = parsed.links;
        page.cookies = parsed.cookies;
        page
    }

    /// Overwrite the response-derived fields, leaving element collections alone
    pub fn refresh_from(&mut self, response: &Response, parsed: &ParsedResponse) {
        self.url = parsed.url.clone();
        self.query_vars = parsed.query_vars.clone();
        self.code = response.code;
        self.method = response.request.method.clone();
        self.body = response.body.clone();
        self.headers = response.headers.clone();
        self.document = parsed.document.clone();
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Total number of auditable elements on the page
    pub fn element_count(&self) -> usize {
        self.forms.len() + self.links.len() + self.cookies.len()
    }
}
