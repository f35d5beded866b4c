use clap::Args;
use std::path::PathBuf;
use subtrack_core::export;

use crate::common::open_tracker;

#[derive(Args)]
pub struct ExportArgs {
    /// Directory to write the CSV into (default: current directory)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, config) = open_tracker()?;
    let dir = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let path = export::write_csv(tracker.subscriptions(), &dir, &config.export.filename)?;
    println!("Exported {} subscriptions to {}", tracker.subscriptions().len(), path.display());
    Ok(())
}
