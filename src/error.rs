//! Error types for the training pipeline
//!
//! Only genuine processing failures live here. Policy decisions (skipping a
//! response because of a cap or a filter rule) are reported through
//! [`crate::trainer::SkipReason`] instead.

/// Failures while parsing a response into structured elements
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The response URL could not be parsed as an absolute URL
    #[error("invalid response URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failures raised inside `Trainer::push`
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    /// Parser collaborator failed on the response
    #[error("parse failure: {0}")]
    Parse(#[from] ParseError),

    /// The `Location` of a redirection could not be resolved
    #[error("cannot resolve redirect location {location:?}: {reason}")]
    Redirect { location: String, reason: String },

    /// Platform fingerprinting failed; never blocks emission
    #[error("fingerprinting failed for {url}: {reason}")]
    Fingerprint { url: String, reason: String },
}

/// Failures of the fetch collaborator used for redirect follow-ups
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Nothing is known for the requested URL
    #[error("no response available for {0}")]
    NotFound(String),

    /// Transport level failure
    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },
}

/// Failure reported by a page observer
#[derive(Debug, thiserror::Error)]
#[error("observer failed: {0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
