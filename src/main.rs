#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The sportvu CLI requires the \"cli\" feature. Rebuild with `--features cli` to enable it."
    );
}

#[cfg(feature = "cli")]
mod cli {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::{Context, Result};
    use clap::Parser;
    use env_logger::Env;
    use log::info;

    use sportvu::{LocationPolicy, LogObserver, Pipeline, PipelineConfig, RunSummary};

    #[derive(Parser)]
    #[command(name = "sportvu")]
    #[command(version, about = "Convert SportVU player-tracking XML logs to per-game CSV files")]
    struct Args {
        /// Directory holding one subdirectory per season
        data_root: PathBuf,

        /// Season directory to convert (repeatable)
        #[arg(short, long = "season", value_name = "SEASON")]
        seasons: Vec<String>,

        /// Number of worker threads [default: 8]
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output directory [default: <DATA_ROOT>/parsed]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// JSON configuration file; command-line flags take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fail a game on the first malformed location entry instead of skipping it
        #[arg(long)]
        strict_locations: bool,
    }

    impl Args {
        fn into_config(self) -> Result<PipelineConfig> {
            let mut config = match &self.config {
                Some(path) => PipelineConfig::from_json_file(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PipelineConfig::new(&self.data_root, Vec::new()),
            };

            config.data_root = self.data_root;
            if !self.seasons.is_empty() {
                config.seasons = self.seasons;
            }
            if let Some(workers) = self.workers {
                config.workers = workers;
            }
            if let Some(output_dir) = self.output_dir {
                config.output_dir = Some(output_dir);
            }
            if self.strict_locations {
                config.location_policy = LocationPolicy::Strict;
            }
            Ok(config)
        }
    }

    fn print_summary(summary: &RunSummary) {
        println!();
        println!("Done:      {}", summary.done);
        println!("Skipped:   {}", summary.skipped);
        println!("Failed:    {}", summary.failed);
        if summary.cancelled > 0 {
            println!("Cancelled: {}", summary.cancelled);
        }
        if summary.discovery_errors > 0 {
            println!("Unreadable seasons: {}", summary.discovery_errors);
        }
        for (game_id, reason) in &summary.failures {
            println!("  {game_id}: {reason}");
        }
    }

    pub fn run() -> Result<bool> {
        env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

        let config = Args::parse().into_config()?;
        config.validate().context("invalid configuration")?;

        info!(
            "converting {} season(s) under {} with {} workers",
            config.seasons.len(),
            config.data_root.display(),
            config.workers
        );

        let start = Instant::now();
        let summary = Pipeline::new(config)
            .with_observer(Arc::new(LogObserver))
            .run()
            .context("pipeline failed")?;

        print_summary(&summary);
        println!("Total time: {:.2?}", start.elapsed());

        Ok(summary.is_success())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    if !cli::run()? {
        std::process::exit(1);
    }
    Ok(())
}
