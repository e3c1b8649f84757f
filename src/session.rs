//! Serialized response processing
//!
//! Responses may complete on any task, but the trainer's state is only ever
//! touched by one worker. Handles enqueue work on an unbounded channel;
//! redirect follow-ups are fetched on their own tasks and their results are
//! queued back to the same worker.

use crate::fetch::Fetcher;
use crate::page::Page;
use crate::response::Response;
use crate::trainer::{TrainOutcome, Trainer, redirect};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

enum Command {
    Seed(Page),
    Push(Response),
}

/// Cloneable handle for feeding a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Install a new seed page; returns false once the session has ended
    pub fn set_seed(&self, page: Page) -> bool {
        self.commands.send(Command::Seed(page)).is_ok()
    }

    /// Queue a completed response; returns false once the session has ended
    pub fn push(&self, response: Response) -> bool {
        self.commands.send(Command::Push(response)).is_ok()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Seed(page) => write!(f, "Seed({})", page.url),
            Command::Push(response) => write!(f, "Push({})", response.url),
        }
    }
}

/// Counters collected over a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub pushed: usize,
    pub trained: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub redirects: usize,
    pub failed: usize,
}

/// Start a session worker that owns `trainer`
///
/// The worker finishes once every handle is dropped and no redirect
/// follow-up is still in flight; it then yields the session report.
pub fn start<F: Fetcher>(trainer: Trainer, fetcher: F) -> (SessionHandle, JoinHandle<SessionReport>) {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_loop(trainer, Arc::new(fetcher), commands_rx));

    (
        SessionHandle {
            commands: commands_tx,
        },
        worker,
    )
}

async fn worker_loop<F: Fetcher>(
    mut trainer: Trainer,
    fetcher: Arc<F>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) -> SessionReport {
    ::log::debug!("Session worker started");

    // Follow-ups report back `None` when their fetch failed
    let (follow_tx, mut follow_rx) = mpsc::unbounded_channel::<Option<(Response, usize)>>();
    let mut report = SessionReport::default();
    let mut commands_open = true;
    let mut in_flight = 0usize;

    while commands_open || in_flight > 0 {
        let (response, hops) = tokio::select! {
            command = commands.recv(), if commands_open => match command {
                Some(Command::Seed(page)) => {
                    if let Err(e) = trainer.set_seed(&page) {
                        ::log::error!("Rejected seed page: {}", e);
                    }
                    continue;
                }
                Some(Command::Push(response)) => (response, 0),
                None => {
                    ::log::debug!("All session handles dropped, {} follow-ups in flight", in_flight);
                    commands_open = false;
                    continue;
                }
            },
            Some(followed) = follow_rx.recv(), if in_flight > 0 => {
                in_flight -= 1;
                match followed {
                    Some(followed) => followed,
                    None => continue,
                }
            }
        };

        report.pushed += 1;
        match trainer.push(&response) {
            TrainOutcome::Trained(_) => report.trained += 1,
            TrainOutcome::NoChange => report.unchanged += 1,
            TrainOutcome::Skipped(_) => report.skipped += 1,
            TrainOutcome::Failed(_) => report.failed += 1,
            TrainOutcome::Redirected(target) => {
                report.redirects += 1;
                if hops >= trainer.config().max_redirects {
                    ::log::warn!("Giving up on {} after {} redirects", response.url, hops);
                    continue;
                }
                in_flight += 1;

                let fetcher = Arc::clone(&fetcher);
                let follow_tx = follow_tx.clone();
                let origin = response.request.clone();
                tokio::spawn(async move {
                    let followed = match redirect::follow(fetcher.as_ref(), target, &origin).await {
                        Ok(response) => Some((response, hops + 1)),
                        Err(e) => {
                            ::log::warn!("Redirect follow-up failed: {}", e);
                            None
                        }
                    };
                    let _ = follow_tx.send(followed);
                });
            }
        }
    }

    ::log::info!(
        "Session finished: {} pushed, {} trained, {} redirects, {} skipped, {} failed",
        report.pushed,
        report.trained,
        report.redirects,
        report.skipped,
        report.failed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainerConfig;
    use crate::fetch::ReplayFetcher;

    fn html(url: &str, body: &str) -> Response {
        Response::new(url, 200, body).with_header("Content-Type", "text/html")
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<Page>) -> Vec<Page> {
        let mut pages = Vec::new();
        while let Some(page) = rx.recv().await {
            pages.push(page);
        }
        pages
    }

    #[tokio::test]
    async fn test_redirect_follow_up_is_trained() {
        let (tx, rx) = mpsc::unbounded_channel();
        let trainer = Trainer::new(TrainerConfig::default(), tx).unwrap();
        let fetcher = ReplayFetcher::new(vec![html(
            "http://a/new",
            r#"<form action="/login" method="post"><input name="user"></form>"#,
        )]);

        let (handle, worker) = start(trainer, fetcher);
        assert!(handle.set_seed(Page::new("http://a/b")));
        assert!(handle.push(Response::new("http://a/b", 302, "").with_header("Location", "/new")));
        drop(handle);

        let report = worker.await.unwrap();
        assert_eq!(report.pushed, 2);
        assert_eq!(report.redirects, 1);
        assert_eq!(report.trained, 1);

        let pages = collect(rx).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "http://a/new");
        assert_eq!(pages[0].forms.len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_loops_give_up() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = TrainerConfig {
            max_redirects: 3,
            ..TrainerConfig::default()
        };
        let trainer = Trainer::new(config, tx).unwrap();
        let fetcher = ReplayFetcher::new(vec![
            Response::new("http://a/loop", 302, "").with_header("Location", "/loop"),
        ]);

        let (handle, worker) = start(trainer, fetcher);
        handle.set_seed(Page::new("http://a/"));
        handle.push(Response::new("http://a/start", 302, "").with_header("Location", "/loop"));
        drop(handle);

        let report = worker.await.unwrap();
        // The pushed response plus three follow-ups, all redirects
        assert_eq!(report.pushed, 4);
        assert_eq!(report.redirects, 4);
        assert_eq!(report.trained, 0);
    }

    #[tokio::test]
    async fn test_failed_follow_up_does_not_stall_the_session() {
        let (tx, rx) = mpsc::unbounded_channel();
        let trainer = Trainer::new(TrainerConfig::default(), tx).unwrap();

        let (handle, worker) = start(trainer, ReplayFetcher::default());
        handle.set_seed(Page::new("http://a/b"));
        handle.push(Response::new("http://a/b", 302, "").with_header("Location", "/gone"));
        handle.push(html("http://a/c", r#"<a href="/d">d</a>"#));
        drop(handle);

        let report = worker.await.unwrap();
        assert_eq!(report.pushed, 2);
        assert_eq!(report.redirects, 1);
        assert_eq!(report.trained, 1);
        assert_eq!(collect(rx).await.len(), 1);
    }

    #[tokio::test]
    async fn test_cloned_handles_keep_the_session_open() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let trainer = Trainer::new(TrainerConfig::default(), tx).unwrap();

        let (handle, worker) = start(trainer, ReplayFetcher::default());
        let spare = handle.clone();
        drop(handle);
        assert!(spare.push(html("http://a/x", "<p>x</p>")));
        drop(spare);

        // Unseeded, so the one response is skipped
        let report = worker.await.unwrap();
        assert_eq!(report.pushed, 1);
        assert_eq!(report.skipped, 1);
    }
}
