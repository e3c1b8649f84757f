pub mod cookies;
pub mod html;

use crate::elements::{Cookie, Form, Link};
use crate::error::ParseError;
use crate::page::Document;
use crate::response::Response;
use std::collections::BTreeMap;
use url::Url;

/// How a response body should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML markup, parsed for forms and links
    Html,
    /// Other textual content (plain text, JSON, XML, scripts)
    Text,
    /// Anything that is not safe to treat as text
    Binary,
}

impl ParserType {
    /// Classify a response by its content type, falling back to the URL
    pub fn from_response(response: &Response) -> Self {
        if response.body.contains('\0') {
            ::log::debug!("Classifying as Binary (NUL in body): {}", response.url);
            return ParserType::Binary;
        }

        match response.content_type() {
            Some(ct) => Self::from_content_type(&ct),
            None => Self::from_url(&response.url),
        }
    }

    pub fn from_content_type(content_type: &str) -> Self {
        if content_type == "text/html" || content_type == "application/xhtml+xml" {
            ParserType::Html
        } else if content_type.starts_with("text/")
            || content_type.contains("json")
            || content_type.contains("xml")
            || content_type.contains("javascript")
        {
            ParserType::Text
        } else {
            ParserType::Binary
        }
    }

    /// Determines the parser type based on the URL path
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();

        if path.ends_with(".txt") || path.ends_with(".yaml") || path.ends_with(".yml") {
            ::log::debug!("Classifying as Text: {}", url);
            ParserType::Text
        } else if [
            ".jpg", ".jpeg", ".png", ".gif", ".ico", ".pdf", ".zip", ".gz", ".woff", ".woff2",
            ".ttf", ".mp3", ".mp4",
        ]
        .iter()
        .any(|ext| path.ends_with(ext))
        {
            ::log::debug!("Classifying as Binary: {}", url);
            ParserType::Binary
        } else {
            // Default to HTML for most URLs
            ParserType::Html
        }
    }

    pub fn is_textual(&self) -> bool {
        !matches!(self, ParserType::Binary)
    }
}

/// Structured view of a response
#[derive(Debug, Clone, Default)]
pub struct ParsedResponse {
    /// Canonical URL (fragment removed)
    pub url: String,
    pub query_vars: BTreeMap<String, String>,
    pub document: Document,
    pub forms: Vec<Form>,
    pub links: Vec<Link>,
    pub cookies: Vec<Cookie>,
}

/// Parser collaborator used by the trainer
pub trait ResponseParser: Send {
    /// Whether the body can be parsed at all
    fn is_textual(&self, response: &Response) -> bool {
        ParserType::from_response(response).is_textual()
    }

    /// Cookies set by the response, without touching the body
    fn cookies(&self, response: &Response) -> Result<Vec<Cookie>, ParseError>;

    /// Full parse of the response, cookies included
    fn parse(&self, response: &Response) -> Result<ParsedResponse, ParseError>;
}

/// Default parser backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

/// Response URL with the fragment removed
fn response_url(response: &Response) -> Result<Url, ParseError> {
    let mut url = Url::parse(&response.url).map_err(|source| ParseError::InvalidUrl {
        url: response.url.clone(),
        source,
    })?;
    url.set_fragment(None);
    Ok(url)
}

impl ResponseParser for HtmlParser {
    fn cookies(&self, response: &Response) -> Result<Vec<Cookie>, ParseError> {
        let url = response_url(response)?;
        Ok(cookies::from_response(response, &url))
    }

    fn parse(&self, response: &Response) -> Result<ParsedResponse, ParseError> {
        let url = response_url(response)?;

        let query_vars = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let cookies = cookies::from_response(response, &url);

        let parsed = match ParserType::from_response(response) {
            ParserType::Html => {
                let extracted = html::parse(&response.body, &url);
                ParsedResponse {
                    url: url.to_string(),
                    query_vars,
                    document: extracted.document,
                    forms: extracted.forms,
                    links: extracted.links,
                    cookies,
                }
            }
            ParserType::Text | ParserType::Binary => ParsedResponse {
                url: url.to_string(),
                query_vars,
                document: Document {
                    title: None,
                    text: html::normalize_whitespace(&response.body),
                },
                forms: Vec::new(),
                links: Vec::new(),
                cookies,
            },
        };

        ::log::debug!(
            "Parsed {}: {} forms, {} links, {} cookies",
            parsed.url,
            parsed.forms.len(),
            parsed.links.len(),
            parsed.cookies.len()
        );
        Ok(parsed)
    }
}
