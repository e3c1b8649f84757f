//! The training controller
//!
//! Every completed, trainable response is pushed through [`Trainer::push`].
//! The trainer decides whether the response is worth looking at, diffs its
//! elements against everything the scan already knows and, when something new
//! turns up, emits a page built from the seed page and the delta.
//!
//! The trainer is a plain `&mut self` state machine. Concurrent callers must
//! serialize through a single owner; see [`crate::session`].

pub mod observers;
pub mod redirect;


use crate::config::TrainerConfig;
use crate::elements::{Form, Link};
use crate::error::{ObserverError, ParseError, TrainError};
use crate::filter::ScopeFilter;
use crate::fingerprint::{Fingerprinter, HeaderFingerprinter};
use crate::frontier::{Frontier, ResourceLimit};
use crate::page::Page;
use crate::parsers::{HtmlParser, ParsedResponse, ResponseParser};
use crate::registry::ElementRegistry;
use crate::response::Response;
use observers::ObserverList;
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Why a response was not analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The originating request opted out of training
    NotTrainable,
    /// No seed page installed yet
    NoSeed,
    /// The crawl-wide resource budget is exhausted
    BudgetExhausted,
    /// The body is not textual
    NotTextual,
    /// The URL already reached its training cap
    MaxTrainings,
    /// The URL matches a redundancy pattern or looks like a trap
    RedundantPath,
    /// The response matches an exclusion rule
    Excluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NotTrainable => "not trainable",
            SkipReason::NoSeed => "no seed page",
            SkipReason::BudgetExhausted => "resource budget exhausted",
            SkipReason::NotTextual => "not textual",
            SkipReason::MaxTrainings => "max trainings reached",
            SkipReason::RedundantPath => "redundant path",
            SkipReason::Excluded => "excluded",
        };
        f.write_str(reason)
    }
}

/// Summary of one successful training
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Training {
    /// URL of the emitted page
    pub url: String,
    pub new_cookies: usize,
    pub new_forms: usize,
    pub new_links: usize,
    /// Trainings recorded for this URL, including this one
    pub trainings: usize,
}

/// Result of pushing a response
#[derive(Debug)]
pub enum TrainOutcome {
    /// A page with new elements was emitted
    Trained(Training),
    /// The response was analyzed but revealed nothing new
    NoChange,
    /// The response was not analyzed
    Skipped(SkipReason),
    /// The response is a redirection to this absolute URL
    Redirected(Url),
    /// Processing failed; the scan carries on
    Failed(TrainError),
}

impl TrainOutcome {
    pub fn trained(&self) -> bool {
        matches!(self, TrainOutcome::Trained(_))
    }
}

/// Drives incremental discovery for one scan
pub struct Trainer {
    filter: ScopeFilter,
    parser: Box<dyn ResponseParser>,
    registry: ElementRegistry,
    trainings: HashMap<String, usize>,
    seed: Option<Page>,
    dirty: bool,
    observers: ObserverList,
    frontier: Box<dyn Frontier>,
    limit: Option<Box<dyn ResourceLimit>>,
    fingerprinter: Box<dyn Fingerprinter>,
}

impl Trainer {
    /// Create a trainer that hands emitted pages to `frontier`
    pub fn new(config: TrainerConfig, frontier: impl Frontier + 'static) -> Result<Self, regex::Error> {
        Ok(Self {
            filter: ScopeFilter::new(&config)?,
            parser: Box::new(HtmlParser),
            registry: ElementRegistry::new(),
            trainings: HashMap::new(),
            seed: None,
            dirty: false,
            observers: ObserverList::new(),
            frontier: Box::new(frontier),
            limit: None,
            fingerprinter: Box::new(HeaderFingerprinter::new()?),
        })
    }

    /// Replace the parser collaborator
    pub fn with_parser(mut self, parser: impl ResponseParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Install the crawl-wide resource limit oracle
    pub fn with_resource_limit(mut self, limit: impl ResourceLimit + 'static) -> Self {
        self.limit = Some(Box::new(limit));
        self
    }

    /// Replace the platform fingerprinter
    pub fn with_fingerprinter(mut self, fingerprinter: impl Fingerprinter + 'static) -> Self {
        self.fingerprinter = Box::new(fingerprinter);
        self
    }

    /// Register an observer for emitted pages
    pub fn on_new_page<F>(&mut self, observer: F)
    where
        F: FnMut(&Page) -> Result<(), ObserverError> + Send + 'static,
    {
        self.observers.register(observer);
    }

    pub fn config(&self) -> &TrainerConfig {
        self.filter.config()
    }

    /// Swap configuration; takes effect on the next push
    pub fn set_config(&mut self, config: TrainerConfig) -> Result<(), regex::Error> {
        self.filter = ScopeFilter::new(&config)?;
        Ok(())
    }

    /// Install a copy of `page` as the baseline for future diffs
    pub fn set_seed(&mut self, page: &Page) -> Result<(), ParseError> {
        Url::parse(&page.url).map_err(|source| ParseError::InvalidUrl {
            url: page.url.clone(),
            source,
        })?;

        self.registry.register(&page.cookies);
        self.registry.register(&page.forms);
        self.registry.register(&page.links);
        self.seed = Some(page.clone());
        self.dirty = false;

        ::log::debug!(
            "Seed page set to {} with {} known elements",
            page.url,
            page.element_count()
        );
        Ok(())
    }

    pub fn seed(&self) -> Option<&Page> {
        self.seed.as_ref()
    }

    /// Whether an analysis started mutating state and did not finish
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Number of trainings recorded for a URL
    pub fn trainings_for(&self, url: &str) -> usize {
        Url::parse(url)
            .ok()
            .and_then(|u| self.trainings.get(self.filter.normalize_url(&u).as_str()).copied())
            .unwrap_or(0)
    }

    /// Base URL for resolving redirects: the seed's URL, else the entry URL
    pub fn redirect_base(&self) -> Option<&str> {
        self.seed
            .as_ref()
            .map(|seed| seed.url.as_str())
            .or(self.config().entry_url.as_deref())
    }

    /// Process one completed response
    ///
    /// Never fails: errors are logged and reported as [`TrainOutcome::Failed`].
    pub fn push(&mut self, response: &Response) -> TrainOutcome {
        let outcome = self.evaluate(response).unwrap_or_else(TrainOutcome::Failed);

        match &outcome {
            TrainOutcome::Trained(training) => ::log::info!(
                "Trained on {} ({} of {}): {} new cookies, {} new forms, {} new links",
                training.url,
                training.trainings,
                self.config().max_trainings_per_url,
                training.new_cookies,
                training.new_forms,
                training.new_links
            ),
            TrainOutcome::NoChange => ::log::debug!("Nothing new in {}", response.url),
            TrainOutcome::Skipped(reason) => {
                ::log::debug!("Skipping {}: {}", response.url, reason)
            }
            TrainOutcome::Redirected(target) => {
                ::log::debug!("{} redirects to {}", response.url, target)
            }
            TrainOutcome::Failed(e) => ::log::warn!("Training failed for {}: {}", response.url, e),
        }

        outcome
    }

    fn evaluate(&mut self, response: &Response) -> Result<TrainOutcome, TrainError> {
        if !response.request.trainable {
            return Ok(TrainOutcome::Skipped(SkipReason::NotTrainable));
        }

        // An exhausted budget must not trigger redirect follow-ups
        if self.limit.as_ref().is_some_and(|limit| limit.reached()) {
            return Ok(TrainOutcome::Skipped(SkipReason::BudgetExhausted));
        }

        if let Some(location) = response.location() {
            let target = redirect::resolve(location, self.redirect_base())?;
            return Ok(TrainOutcome::Redirected(target));
        }

        if self.seed.is_none() {
            return Ok(TrainOutcome::Skipped(SkipReason::NoSeed));
        }

        if !self.parser.is_textual(response) {
            return Ok(TrainOutcome::Skipped(SkipReason::NotTextual));
        }

        let url = Url::parse(&response.url).map_err(|source| ParseError::InvalidUrl {
            url: response.url.clone(),
            source,
        })?;
        let key = self.filter.normalize_url(&url);

        let trainings = self.trainings.get(key.as_str()).copied().unwrap_or(0);
        if trainings >= self.config().max_trainings_per_url {
            return Ok(TrainOutcome::Skipped(SkipReason::MaxTrainings));
        }

        if self.filter.is_redundant_path(&url) {
            return Ok(TrainOutcome::Skipped(SkipReason::RedundantPath));
        }

        if self.filter.should_skip_resource(response, &url) {
            return Ok(TrainOutcome::Skipped(SkipReason::Excluded));
        }

        self.analyze(response, key)
    }

    fn analyze(&mut self, response: &Response, url: Url) -> Result<TrainOutcome, TrainError> {
        let Some(mut page) = self.seed.clone() else {
            return Ok(TrainOutcome::Skipped(SkipReason::NoSeed));
        };
        let key = url.to_string();

        // An unchanged body at the seed's URL cannot hold new forms or links,
        // so only its cookies are looked at
        let unchanged = response.body == page.body && key == normalized(&page.url);
        let mut parsed = if unchanged {
            ParsedResponse {
                url: key.clone(),
                query_vars: url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
                document: page.document.clone(),
                cookies: self.parser.cookies(response)?,
                ..ParsedResponse::default()
            }
        } else {
            self.parser.parse(response)?
        };

        self.dirty = true;

        // Cookies can change without any body difference, so always diff them
        let cookies = self
            .registry
            .update(std::mem::take(&mut parsed.cookies), &parsed.url);

        if unchanged && cookies.is_empty() {
            self.dirty = false;
            return Ok(TrainOutcome::NoChange);
        }

        let in_scope =
            |target: &str| Url::parse(target).is_ok_and(|u| self.filter.should_crawl(&u));
        let forms: Vec<Form> = std::mem::take(&mut parsed.forms)
            .into_iter()
            .filter(|form| in_scope(&form.action))
            .collect();
        let links: Vec<Link> = std::mem::take(&mut parsed.links)
            .into_iter()
            .filter(|link| in_scope(&link.url))
            .collect();

        let forms = self.registry.update(forms, &parsed.url);
        let links = self.registry.update(links, &parsed.url);

        if cookies.is_empty() && forms.is_empty() && links.is_empty() {
            self.dirty = false;
            return Ok(TrainOutcome::NoChange);
        }

        let trainings = self.trainings.entry(key).or_insert(0);
        *trainings += 1;
        let training = Training {
            url: parsed.url.clone(),
            new_cookies: cookies.count(),
            new_forms: forms.count(),
            new_links: links.count(),
            trainings: *trainings,
        };

        page.cookies = cookies.elements;
        page.forms = forms.elements;
        page.links = links.elements;
        page.refresh_from(response, &parsed);

        // Platforms describe the triggering response, never the seed
        page.platforms.clear();
        if self.config().fingerprint {
            match self.fingerprinter.fingerprint(&page) {
                Ok(platforms) => page.platforms = platforms,
                Err(e) => ::log::warn!("{}", e),
            }
        }

        self.observers.notify(&page);
        self.frontier.accept(page);
        self.dirty = false;

        Ok(TrainOutcome::Trained(training))
    }
}

/// Fragment-free form of a URL string, or the string itself if unparseable
fn normalized(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

impl fmt::Debug for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainer")
            .field("seed", &self.seed.as_ref().map(|s| s.url.as_str()))
            .field("trainings", &self.trainings.len())
            .field("registry", &self.registry)
            .field("observers", &self.observers)
            .field("dirty", &self.dirty)
            .finish()
    }
}
