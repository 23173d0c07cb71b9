use crate::{
	config::{
		self, Config, DEFAULT_ANCESTOR_LEVELS, DEFAULT_PERMUTATION_COUNT, MODEL_FILE_NAME,
		TEST_FILE_NAME, TRAIN_FILE_NAME,
	},
	importance::{self, RankedFeatureImportance},
	load::load,
	path::resolve,
	predict::{canonical_record, predict_one, CANONICAL_ACTUAL},
	regressor::GbtRegressionTrainer,
	schema::PredictionResult,
	test::{evaluate, EvaluationMetrics},
	train::fit,
	Context, Error,
};
use rrt_tree::TrainOptions;
use std::path::{Path, PathBuf};

/// Everything a run needs, with the config and command line already merged.
#[derive(Clone, Debug)]
pub struct RunOptions {
	pub context: Context,
	pub data_dir: PathBuf,
	pub train_file_name: String,
	pub test_file_name: String,
	pub model_file_name: String,
	pub permutation_count: usize,
	pub tree_options: TrainOptions,
}

impl RunOptions {
	/// Resolve the options from a config. Without `data_dir`, the data directory is found by ascending the configured number of levels from `working_dir`.
	pub fn from_config(config: &Config, working_dir: &Path, data_dir: Option<PathBuf>) -> RunOptions {
		let data_dir = data_dir.unwrap_or_else(|| {
			resolve(
				working_dir,
				config.ancestor_levels.unwrap_or(DEFAULT_ANCESTOR_LEVELS),
			)
		});
		RunOptions {
			context: Context {
				seed: config.seed.unwrap_or(config::DEFAULT_SEED),
			},
			data_dir,
			train_file_name: config
				.train_file_name
				.clone()
				.unwrap_or_else(|| TRAIN_FILE_NAME.to_owned()),
			test_file_name: config
				.test_file_name
				.clone()
				.unwrap_or_else(|| TEST_FILE_NAME.to_owned()),
			model_file_name: config
				.model_file_name
				.clone()
				.unwrap_or_else(|| MODEL_FILE_NAME.to_owned()),
			permutation_count: config
				.permutation_count
				.unwrap_or(DEFAULT_PERMUTATION_COUNT),
			tree_options: config.tree_options(),
		}
	}
}

#[derive(Debug)]
pub enum RunOutcome {
	Completed(RunReport),
	/// An input file was missing, so nothing ran and no model was written.
	MissingFile(PathBuf),
}

#[derive(Debug)]
pub struct RunReport {
	pub metrics: EvaluationMetrics,
	pub prediction: PredictionResult,
	pub actual: f64,
	pub model_path: PathBuf,
	pub importances: Vec<RankedFeatureImportance>,
}

/// Train, evaluate, predict, save and explain, in that order.
pub fn run(options: &RunOptions) -> Result<RunOutcome, Error> {
	let train_path = options.data_dir.join(&options.train_file_name);
	let test_path = options.data_dir.join(&options.test_file_name);
	for path in [&train_path, &test_path] {
		if !path.is_file() {
			tracing::warn!(path = %path.display(), "input file not found");
			return Ok(RunOutcome::MissingFile(path.clone()));
		}
	}

	tracing::info!(path = %train_path.display(), "loading training data");
	let train = load(&train_path, true, b',')?;
	tracing::info!(rows = train.nrows(), "loaded training data");

	let model = fit(&options.context, &options.tree_options, &train)?;

	tracing::info!(path = %test_path.display(), "evaluating on test data");
	let test = load(&test_path, true, b',')?;
	let metrics = evaluate(&model, &test)?;

	let prediction = predict_one(&model, &canonical_record())?;

	let model_path = options.data_dir.join(&options.model_file_name);
	model.to_path(&model_path)?;
	tracing::info!(path = %model_path.display(), "wrote model");

	let trainer = GbtRegressionTrainer {
		options: options.tree_options.clone(),
	};
	let importances = importance::report(
		&options.context,
		&trainer,
		&model,
		&train,
		options.permutation_count,
	)?;

	Ok(RunOutcome::Completed(RunReport {
		metrics,
		prediction,
		actual: CANONICAL_ACTUAL,
		model_path,
		importances,
	}))
}
