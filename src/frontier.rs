//! Outbound hand-off of emitted pages and the crawl-wide resource budget

use crate::page::Page;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// The crawl frontier ("page queue") accepting newly discovered pages
pub trait Frontier: Send {
    fn accept(&mut self, page: Page);
}

impl Frontier for mpsc::UnboundedSender<Page> {
    fn accept(&mut self, page: Page) {
        let url = page.url.clone();
        if self.send(page).is_err() {
            ::log::warn!("Frontier receiver dropped, discarding page {}", url);
        }
    }
}

/// Crawl-wide "budget exhausted" oracle
pub trait ResourceLimit: Send {
    fn reached(&self) -> bool;
}

impl<F> ResourceLimit for F
where
    F: Fn() -> bool + Send,
{
    fn reached(&self) -> bool {
        self()
    }
}

/// Shared page counter with an optional ceiling
///
/// Clones share the same counter, so one clone can count emitted pages from
/// an observer while another serves as the trainer's resource limit.
#[derive(Debug, Clone, Default)]
pub struct PageBudget {
    max_pages: Option<usize>,
    pages: Arc<AtomicUsize>,
}

impl PageBudget {
    pub fn new(max_pages: Option<usize>) -> Self {
        Self {
            max_pages,
            pages: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn record(&self) {
        self.pages.fetch_add(1, Ordering::SeqCst);
    }

    pub fn pages(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }
}

impl ResourceLimit for PageBudget {
    fn reached(&self) -> bool {
        self.max_pages.is_some_and(|max| self.pages() >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_shared_between_clones() {
        let budget = PageBudget::new(Some(2));
        let counter = budget.clone();

        assert!(!budget.reached());
        counter.record();
        counter.record();
        assert_eq!(budget.pages(), 2);
        assert!(budget.reached());
    }

    #[test]
    fn test_unlimited_budget_never_reached() {
        let budget = PageBudget::new(None);
        for _ in 0..1000 {
            budget.record();
        }
        assert!(!budget.reached());
    }

    #[test]
    fn test_closure_limit() {
        let limit = || true;
        assert!(limit.reached());
    }

    #[tokio::test]
    async fn test_channel_frontier_delivers_pages() {
        let (mut tx, mut rx) = mpsc::unbounded_channel::<Page>();
        tx.accept(Page::new("http://a/"));
        assert_eq!(rx.recv().await.map(|p| p.url), Some("http://a/".to_string()));
    }
}
