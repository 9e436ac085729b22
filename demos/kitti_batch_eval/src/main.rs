//! Batch loop-closure evaluation over a KITTI raw drive.
//!
//! ```bash
//! RUST_LOG=info cargo run --release -p kitti_batch_eval -- \
//!     --kitti-raw-dir /data/kitti_raw --date 2011_09_30 \
//!     --drive 2011_09_30_drive_0018_sync --thresholds config/score_thresholds.toml
//! ```

mod rerun_observer;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use contlcd_core::Dataset;
use contlcd_dataset_reader::KittiRawReader;
use contlcd_eval::{
    default_thresholds, pr_table, EvaluationDriverCfg, GroundTruthEvaluatorCfg, NullMatcher,
    StepOutcome,
};
use serde::Deserialize;

use crate::rerun_observer::RerunPoseObserver;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Root of the KITTI raw dataset
    #[arg(long, default_value = "datasets/kitti_raw")]
    kitti_raw_dir: PathBuf,

    #[arg(long, default_value = "2011_09_30")]
    date: String,

    #[arg(long, default_value = "2011_09_30_drive_0018_sync")]
    drive: String,

    /// TOML file with `[driver]` and `[ground_truth]` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Score threshold file, overrides the config
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Where to write the prediction report, overrides the config
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long)]
    max_iterations: Option<usize>,

    /// Replay as fast as possible instead of at the polling rate
    #[arg(long)]
    no_pacing: bool,

    /// Stream poses and loops to a rerun viewer
    #[arg(long)]
    rerun: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppConfig {
    driver: EvaluationDriverCfg,
    ground_truth: GroundTruthEvaluatorCfg,
}

impl AppConfig {
    fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => AppConfig::default(),
        };
        if let Some(path) = &args.thresholds {
            config.driver.threshold_path = path.clone();
        }
        if let Some(path) = &args.report {
            config.driver.report_path = path.clone();
        }
        if let Some(max_iterations) = args.max_iterations {
            config.driver.max_iterations = max_iterations;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = AppConfig::from_args(&args)?;
    log::debug!("{config:?}");

    let reader = KittiRawReader::new(&args.kitti_raw_dir, &args.date, &args.drive);
    let sequence = reader.into_sequence()?;
    anyhow::ensure!(
        !sequence.is_empty(),
        "no ground truth poses under {}",
        args.kitti_raw_dir.display()
    );

    let evaluator = config.ground_truth.finalize(sequence.trajectory());
    let poll_interval = config.driver.poll_interval();
    let retry_delay = config.driver.retry_delay();

    // no recognition backend is linked in; the null matcher gives the TN/FN baseline
    let mut driver = config
        .driver
        .finalize(sequence.iter(), NullMatcher::default(), evaluator)?;
    if args.rerun {
        driver.add_observer(Box::new(RerunPoseObserver::spawn()?));
    }

    while let Some(step) = driver.poll_step()? {
        if args.no_pacing {
            continue;
        }
        if let StepOutcome::Skipped { .. } = step {
            std::thread::sleep(retry_delay);
        }
        std::thread::sleep(poll_interval);
    }

    let summary = driver.finalize()?;
    summary.print();
    pr_table(driver.evaluator().records(), &default_thresholds()).print();
    Ok(())
}
