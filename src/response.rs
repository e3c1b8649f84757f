use serde::{Deserialize, Serialize};

/// The request that produced a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Transport-assigned request id
    #[serde(default)]
    pub id: u64,

    /// HTTP method, upper-cased
    #[serde(default = "default_method")]
    pub method: String,

    /// Whether the response is eligible for discovery analysis
    #[serde(default = "default_trainable")]
    pub trainable: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_trainable() -> bool {
    true
}

impl Default for Request {
    fn default() -> Self {
        Self {
            id: 0,
            method: default_method(),
            trainable: default_trainable(),
        }
    }
}

impl Request {
    pub fn new(id: u64, method: &str) -> Self {
        Self {
            id,
            method: method.to_uppercase(),
            trainable: true,
        }
    }
}

/// A completed HTTP response as delivered by the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Effective URL of the response
    pub url: String,

    /// HTTP status code
    pub code: u16,

    /// Response headers in arrival order; repeated names are kept
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    /// Decoded response body
    #[serde(default)]
    pub body: String,

    /// Originating request
    #[serde(default)]
    pub request: Request,
}

impl Response {
    /// Create a trainable `GET` response with no headers
    pub fn new(url: &str, code: u16, body: &str) -> Self {
        Self {
            url: url.to_string(),
            code,
            headers: Vec::new(),
            body: body.to_string(),
            request: Request::default(),
        }
    }

    /// Append a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Replace the originating request
    pub fn with_request(mut self, request: Request) -> Self {
        self.request = request;
        self
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, matched case-insensitively
    pub fn header_values<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Media type without parameters, lower-cased
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type").map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.code)
    }

    /// The raw `Location` of a redirection, if it carries a usable one
    pub fn location(&self) -> Option<&str> {
        if !self.is_redirection() {
            return None;
        }
        self.header("location")
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
    }
}
