//! Fetch collaborator used for redirect follow-ups

use crate::error::FetchError;
use crate::response::Response;
use std::collections::HashMap;
use std::future::Future;
use url::Url;

/// Issues a request and yields the completed response
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: Url) -> impl Future<Output = Result<Response, FetchError>> + Send;
}

/// Serves previously recorded responses keyed by URL
#[derive(Debug, Clone, Default)]
pub struct ReplayFetcher {
    responses: HashMap<String, Response>,
}

impl ReplayFetcher {
    pub fn new(recorded: impl IntoIterator<Item = Response>) -> Self {
        let responses = recorded
            .into_iter()
            .map(|response| (response.url.clone(), response))
            .collect();
        Self { responses }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl Fetcher for ReplayFetcher {
    async fn fetch(&self, url: Url) -> Result<Response, FetchError> {
        ::log::debug!("Replaying {}", url);
        self.responses
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
