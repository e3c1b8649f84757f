use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-trainer")]
#[command(about = "Replays recorded responses through the discovery trainer")]
#[command(version)]
pub struct Args {
    /// Session file (JSON) with the seed response, the responses to push and
    /// recorded responses for redirect follow-ups
    #[arg(short, long)]
    pub session: PathBuf,

    /// Trainer configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the per-URL training cap
    #[arg(long)]
    pub max_trainings: Option<usize>,

    /// Stop training once this many pages were emitted
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Fingerprint platforms on emitted pages
    #[arg(long, default_value_t = false)]
    pub fingerprint: bool,
}
