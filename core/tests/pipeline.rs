use rrt_core::{
	config::{default_tree_options, Config, TEST_FILE_NAME, TRAIN_FILE_NAME},
	features::FEATURES_COLUMN_NAME,
	importance::{self, OUT_OF_RANGE_NAME},
	load::load,
	model::FittedModel,
	predict::{canonical_record, predict_one},
	regressor::GbtRegressionTrainer,
	run, test::evaluate,
	train::fit,
	Context, RunOptions, RunOutcome,
};
use rrt_dataframe::DataFrame;
use rrt_tree::TrainOptions;
use std::path::{Path, PathBuf};

fn data_dir() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn load_train() -> DataFrame {
	load(&data_dir().join(TRAIN_FILE_NAME), true, b',').unwrap()
}

fn load_test() -> DataFrame {
	load(&data_dir().join(TEST_FILE_NAME), true, b',').unwrap()
}

fn quick_options() -> TrainOptions {
	TrainOptions {
		max_rounds: 20,
		..default_tree_options()
	}
}

#[test]
fn test_fit_is_deterministic() {
	let train = load_train();
	let test = load_test();
	let context = Context::default();
	let a = fit(&context, &quick_options(), &train).unwrap();
	let b = fit(&context, &quick_options(), &train).unwrap();
	assert_eq!(a, b);
	assert_eq!(
		a.predict(&test.view()).unwrap(),
		b.predict(&test.view()).unwrap()
	);
}

#[test]
fn test_evaluate() {
	let train = load_train();
	let test = load_test();
	let model = fit(&Context::default(), &default_tree_options(), &train).unwrap();
	let metrics = evaluate(&model, &test).unwrap();
	assert!(metrics.r_squared > 0.5, "r_squared = {}", metrics.r_squared);
	assert!(metrics.root_mean_squared_error < metrics.baseline_root_mean_squared_error);
	assert_eq!(metrics.loss_function_value, metrics.mean_squared_error);
	assert!(
		(metrics.root_mean_squared_error.powi(2) - metrics.mean_squared_error).abs() < 1e-12
	);
}

#[test]
fn test_canonical_prediction_is_finite() {
	let model = fit(&Context::default(), &quick_options(), &load_train()).unwrap();
	let prediction = predict_one(&model, &canonical_record()).unwrap();
	assert!(prediction.avg_rate_of_return.is_finite());
}

#[test]
fn test_unseen_security_predicts() {
	let model = fit(&Context::default(), &quick_options(), &load_train()).unwrap();
	let mut record = canonical_record();
	record.security = "Meridian".to_owned();
	let prediction = predict_one(&model, &record).unwrap();
	assert!(prediction.avg_rate_of_return.is_finite());
	let table = model
		.transform(&rrt_core::schema::records_to_dataframe(&[record]).view())
		.unwrap();
	let security = table.vector("security").unwrap();
	assert!(security.values.iter().all(|value| *value == 0.0));
}

#[test]
fn test_run_never_reaches_the_features() {
	let train = load_train();
	let model = fit(&Context::default(), &quick_options(), &train).unwrap();
	let table = model.transform(&train.view()).unwrap();
	let features = table.vector(FEATURES_COLUMN_NAME).unwrap();
	insta::assert_debug_snapshot!(features.feature_names, @r###"
 [
     "security.Apex",
     "security.Zenith",
     "security.Harbor",
     "security.Pioneer",
     "year",
     "price",
     "delta",
     "isSplit.True",
     "isSplit.False",
     "isBust.False",
     "isBust.True",
     "yield",
 ]
 "###);
	assert!(table.column("run").is_none());
}

#[test]
fn test_model_round_trip() {
	let model = fit(&Context::default(), &quick_options(), &load_train()).unwrap();
	let test = load_test();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model.zip");
	model.to_path(&path).unwrap();
	let loaded = FittedModel::from_path(&path).unwrap();
	assert_eq!(
		model.predict(&test.view()).unwrap(),
		loaded.predict(&test.view()).unwrap()
	);
	let from_slice = FittedModel::from_slice(&model.to_vec().unwrap()).unwrap();
	assert_eq!(model, from_slice);
}

#[test]
fn test_importance_is_deterministic() {
	let train = load_train();
	let context = Context::default();
	let model = fit(&context, &quick_options(), &train).unwrap();
	let trainer = GbtRegressionTrainer {
		options: quick_options(),
	};
	let a = importance::report(&context, &trainer, &model, &train, 2).unwrap();
	let b = importance::report(&context, &trainer, &model, &train, 2).unwrap();
	assert_eq!(a, b);
}

fn run_options(data_dir: PathBuf) -> RunOptions {
	let mut options = RunOptions::from_config(&Config::default(), Path::new("/"), Some(data_dir));
	options.tree_options.max_rounds = 10;
	options.permutation_count = 2;
	options
}

#[test]
fn test_run() {
	let dir = tempfile::tempdir().unwrap();
	for file_name in [TRAIN_FILE_NAME, TEST_FILE_NAME] {
		std::fs::copy(data_dir().join(file_name), dir.path().join(file_name)).unwrap();
	}
	let options = run_options(dir.path().to_owned());
	let report = match run(&options).unwrap() {
		RunOutcome::Completed(report) => report,
		RunOutcome::MissingFile(path) => panic!("missing {}", path.display()),
	};
	assert!(report.model_path.is_file());
	assert!(report.metrics.r_squared.is_finite());
	assert!(report.prediction.avg_rate_of_return.is_finite());
	assert_eq!(report.importances.len(), 12);
	// The transformed table has 9 columns, so the last 3 slots have no name.
	let out_of_range = report
		.importances
		.iter()
		.filter(|importance| importance.feature_name == OUT_OF_RANGE_NAME)
		.count();
	assert_eq!(out_of_range, 3);
	for pair in report.importances.windows(2) {
		assert!(pair[0].importance.mean.abs() >= pair[1].importance.mean.abs());
	}
}

#[test]
fn test_run_with_missing_file() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::copy(
		data_dir().join(TRAIN_FILE_NAME),
		dir.path().join(TRAIN_FILE_NAME),
	)
	.unwrap();
	let options = run_options(dir.path().to_owned());
	match run(&options).unwrap() {
		RunOutcome::MissingFile(path) => assert_eq!(path, dir.path().join(TEST_FILE_NAME)),
		RunOutcome::Completed(_) => panic!("the run should stop when the test file is missing"),
	}
	assert!(!dir.path().join(&options.model_file_name).exists());
}
