//! Incremental discovery for a web security scanner
//!
//! Every completed response is diffed against what the scan already knows.
//! New cookies, forms and links are registered once, attributed to the page
//! that revealed them, and handed back to the crawl frontier as a fresh page.

pub mod config;
pub mod elements;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod fingerprint;
pub mod frontier;
pub mod page;
pub mod parsers;
pub mod registry;
pub mod response;
pub mod session;
pub mod trainer;

// Re-export commonly used types for convenience
pub use config::TrainerConfig;
pub use error::{FetchError, ObserverError, ParseError, TrainError};
pub use page::Page;
pub use response::{Request, Response};
pub use session::{SessionHandle, SessionReport};
pub use trainer::{SkipReason, TrainOutcome, Trainer, Training};
