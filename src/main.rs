use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use shelter_outcomes::AnalysisConfig;
use shelter_outcomes::analysis::{PIPELINE_STEPS, analyze_files};
use shelter_outcomes::fetch::{
    DEFAULT_INTAKES_URL, DEFAULT_OUTCOMES_URL, DatasetSources, fetch_datasets,
};

#[derive(Parser)]
#[command(name = "shelter-outcomes", version, about = "Animal shelter intake/outcome analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the latest intake and outcome CSV exports
    Fetch {
        /// Directory to write intakes.csv and outcomes.csv into
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
        #[arg(long, env = "SHELTER_INTAKES_URL", default_value = DEFAULT_INTAKES_URL)]
        intakes_url: String,
        #[arg(long, env = "SHELTER_OUTCOMES_URL", default_value = DEFAULT_OUTCOMES_URL)]
        outcomes_url: String,
    },
    /// Join the tables, compute rates and test the hypotheses
    Analyze {
        #[arg(long)]
        intakes: PathBuf,
        #[arg(long)]
        outcomes: PathBuf,
        /// JSON file with analysis settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Adoption-rate cutoff date (YYYY-MM-DD), overrides the config file
        #[arg(long)]
        cutoff: Option<NaiveDate>,
        /// Significance level, overrides the config file
        #[arg(long)]
        alpha: Option<f64>,
        /// Write report.txt, report.json and rates.csv here instead of printing
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Fetch {
            out_dir,
            intakes_url,
            outcomes_url,
        } => {
            let start = Instant::now();
            let sources = DatasetSources {
                intakes_url,
                outcomes_url,
            };
            let datasets = fetch_datasets(&sources, &out_dir)
                .await
                .context("Failed to download shelter datasets")?;
            info!(
                "Fetched {} and {} in {:?}",
                datasets.intakes.display(),
                datasets.outcomes.display(),
                start.elapsed()
            );
        }
        Command::Analyze {
            intakes,
            outcomes,
            config,
            cutoff,
            alpha,
            out_dir,
        } => {
            let mut settings = match &config {
                Some(path) => AnalysisConfig::from_json_file(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?,
                None => AnalysisConfig::default(),
            };
            if let Some(cutoff) = cutoff {
                settings = settings.with_cutoff(cutoff);
            }
            if let Some(alpha) = alpha {
                settings = settings.with_alpha(alpha);
            }
            settings.validate().context("Invalid analysis configuration")?;
            info!("{}", settings.to_string().trim_end());

            let progress = ProgressBar::new(PIPELINE_STEPS);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:20}] {pos}/{len} {msg}")
                    .context("Invalid progress template")?
                    .progress_chars("=> "),
            );
            progress.set_message("loading intakes");

            let report = analyze_files(&settings, &intakes, &outcomes, Some(&progress))
                .context("Analysis failed")?;
            progress.finish_and_clear();

            match out_dir {
                Some(dir) => {
                    let files = report
                        .write_to_dir(&dir)
                        .with_context(|| format!("Failed to write report to {}", dir.display()))?;
                    info!("Text report: {}", files.text.display());
                }
                None => print!("{report}"),
            }
        }
    }

    Ok(())
}
