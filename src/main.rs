use clap::Parser;
use page_trainer::fetch::ReplayFetcher;
use page_trainer::frontier::PageBudget;
use page_trainer::parsers::{HtmlParser, ResponseParser};
use page_trainer::{Page, Response, SessionReport, Trainer, TrainerConfig, session};
use serde::Deserialize;
use std::error::Error;
use tokio::sync::mpsc;

mod args;
use args::Args;

/// Recorded scan replayed through the trainer
#[derive(Debug, Deserialize)]
struct SessionFile {
    /// Response the seed page is built from
    seed: Response,
    /// Responses pushed in order
    #[serde(default)]
    responses: Vec<Response>,
    /// Responses served to redirect follow-ups, keyed by URL
    #[serde(default)]
    recorded: Vec<Response>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let start_time = std::time::Instant::now();
    match run(&args).await {
        Ok(report) => ::log::info!(
            "Replayed {} responses in {:.2} seconds: {} pages emitted, {} unchanged, {} skipped, {} failed",
            report.pushed,
            start_time.elapsed().as_secs_f64(),
            report.trained,
            report.unchanged,
            report.skipped,
            report.failed
        ),
        Err(e) => {
            ::log::error!("Training session failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args) -> Result<SessionReport, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => TrainerConfig::from_file(path)?,
        None => TrainerConfig::default(),
    };
    if let Some(max) = args.max_trainings {
        config.max_trainings_per_url = max;
    }
    if args.fingerprint {
        config.fingerprint = true;
    }

    let session_file: SessionFile =
        serde_json::from_str(&std::fs::read_to_string(&args.session)?)?;
    let seed = Page::from_response(&session_file.seed, HtmlParser.parse(&session_file.seed)?);
    ::log::info!(
        "Seed page {} with {} elements, {} responses to push",
        seed.url,
        seed.element_count(),
        session_file.responses.len()
    );

    let budget = PageBudget::new(args.max_pages);
    let counter = budget.clone();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut trainer = Trainer::new(config, tx)?.with_resource_limit(budget);
    trainer.on_new_page(move |_| {
        counter.record();
        Ok(())
    });

    let (handle, worker) = session::start(trainer, ReplayFetcher::new(session_file.recorded));
    handle.set_seed(seed);
    for response in session_file.responses {
        handle.push(response);
    }
    drop(handle);

    // The channel closes once the worker finishes and drops the trainer
    while let Some(page) = rx.recv().await {
        println!("{}", serde_json::to_string(&page)?);
    }

    Ok(worker.await?)
}
