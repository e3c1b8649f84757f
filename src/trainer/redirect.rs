//! Redirect chasing
//!
//! A redirection's `Location` is resolved here and the target fetched; the
//! follow-up response goes back through `Trainer::push` and is filtered like
//! any other response. Hop counting lives with the caller.

use crate::error::{FetchError, TrainError};
use crate::fetch::Fetcher;
use crate::response::{Request, Response};
use url::Url;

/// Resolve a `Location` to an absolute http(s) URL against `base`
pub fn resolve(location: &str, base: Option<&str>) -> Result<Url, TrainError> {
    let failure = |reason: String| TrainError::Redirect {
        location: location.to_string(),
        reason,
    };

    let resolved = match Url::parse(location) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| failure("no base URL to resolve against".to_string()))?;
            Url::parse(base)
                .and_then(|base| base.join(location))
                .map_err(|e| failure(e.to_string()))?
        }
        Err(e) => return Err(failure(e.to_string())),
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return Err(failure(format!("unsupported scheme {}", resolved.scheme())));
    }
    Ok(resolved)
}

/// Fetch a redirect target on behalf of the request that was redirected
pub async fn follow<F: Fetcher>(
    fetcher: &F,
    target: Url,
    origin: &Request,
) -> Result<Response, FetchError> {
    ::log::debug!("Following redirect of request {} to {}", origin.id, target);

    let mut response = fetcher.fetch(target).await?;
    response.request = Request {
        id: origin.id,
        method: "GET".to_string(),
        trainable: origin.trainable,
    };
    Ok(response)
}
