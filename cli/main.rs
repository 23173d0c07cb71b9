//! This module contains the main entrypoint to the rrt cli.

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rrt_core::{report, Config, RunOptions, RunOutcome};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
	name = "rrt",
	about = "Train a model that predicts the rate of return of a simulated stock.",
	long_about = "Train a gradient boosted tree regressor on the stock price simulation, evaluate it, predict one record, write the model next to the data and rank the features by permutation importance."
)]
struct Options {
	/// the path to a config file
	#[arg(short, long)]
	config: Option<PathBuf>,
	/// the directory holding the csv files, which skips searching for it
	#[arg(long)]
	data_dir: Option<PathBuf>,
	/// how many levels to ascend from the working directory to find the data
	#[arg(long)]
	ancestor_levels: Option<usize>,
	/// the seed for the permutation shuffles
	#[arg(long)]
	seed: Option<u64>,
	/// log each step and training round
	#[arg(short, long)]
	verbose: bool,
}

fn main() {
	let options = Options::parse();
	init_logging(options.verbose);
	if let Err(error) = cli_run(options) {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn init_logging(verbose: bool) {
	let default_level = if verbose { "debug" } else { "info" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

fn cli_run(options: Options) -> Result<()> {
	let mut config = match options.config.as_ref() {
		Some(path) => Config::from_path(path).context("failed to load the config")?,
		None => Config::default(),
	};
	// Flags take precedence over the config file.
	if let Some(seed) = options.seed {
		config.seed = Some(seed);
	}
	if let Some(ancestor_levels) = options.ancestor_levels {
		config.ancestor_levels = Some(ancestor_levels);
	}
	let working_dir =
		std::env::current_dir().context("failed to read the current working directory")?;
	let run_options = RunOptions::from_config(&config, &working_dir, options.data_dir);
	tracing::debug!(data_dir = %run_options.data_dir.display(), "resolved data directory");

	let report = match rrt_core::run(&run_options)? {
		RunOutcome::Completed(report) => report,
		RunOutcome::MissingFile(path) => {
			eprintln!(
				"{}: the input file {} does not exist, so nothing was trained.",
				"warning".yellow().bold(),
				path.display()
			);
			return Ok(());
		}
	};

	print!("{}", report::format_metrics(&report.metrics));
	println!();
	print!(
		"{}",
		report::format_prediction(&report.prediction, report.actual)
	);
	println!();
	print!("{}", report::format_importances(&report.importances));

	eprintln!("Your model was written to {}.", report.model_path.display());

	Ok(())
}
