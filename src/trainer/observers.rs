use crate::error::ObserverError;
use crate::page::Page;

/// Callback invoked for every emitted page
pub type Observer = Box<dyn FnMut(&Page) -> Result<(), ObserverError> + Send>;

/// Observers in registration order
///
/// A failing observer is logged and skipped; the remaining observers still
/// run and the page is still emitted.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Observer>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, observer: F)
    where
        F: FnMut(&Page) -> Result<(), ObserverError> + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Notify every observer, returning how many failed
    pub fn notify(&mut self, page: &Page) -> usize {
        let mut failures = 0;
        for (index, observer) in self.observers.iter_mut().enumerate() {
            if let Err(e) = observer(page) {
                failures += 1;
                ::log::warn!("Observer {} failed on page {}: {}", index, page.url, e);
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
