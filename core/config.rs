/*!
This module defines the `Config` struct, which is read from an optional YAML file, and the `Context` that carries the seed through a run.
*/

use crate::Error;
use rrt_tree::TrainOptions;
use std::path::Path;

pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_ANCESTOR_LEVELS: usize = 4;
pub const DEFAULT_PERMUTATION_COUNT: usize = 10;
pub const TRAIN_FILE_NAME: &str = "StockPriceSimulation_train.csv";
pub const TEST_FILE_NAME: &str = "StockPriceSimulation_test.csv";
pub const MODEL_FILE_NAME: &str = "RrtRegressionModel.zip";

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	pub seed: Option<u64>,
	pub ancestor_levels: Option<usize>,
	pub train_file_name: Option<String>,
	pub test_file_name: Option<String>,
	pub model_file_name: Option<String>,
	pub permutation_count: Option<usize>,
	pub tree: Option<TreeConfig>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct TreeConfig {
	pub compute_loss: Option<bool>,
	pub l2_regularization: Option<f32>,
	pub learning_rate: Option<f32>,
	pub max_depth: Option<usize>,
	pub max_leaf_nodes: Option<usize>,
	pub max_rounds: Option<usize>,
	pub max_valid_bins_for_number_features: Option<u8>,
	pub min_examples_per_child: Option<usize>,
	pub min_gain_to_split: Option<f32>,
	pub min_sum_hessians_per_child: Option<f32>,
}

impl Config {
	pub fn from_path(path: &Path) -> Result<Config, Error> {
		let config = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
			path: path.to_owned(),
			source,
		})?;
		Config::from_str(&config).map_err(|source| Error::ParseConfig {
			path: path.to_owned(),
			source,
		})
	}

	#[allow(clippy::should_implement_trait)]
	pub fn from_str(config: &str) -> Result<Config, serde_yaml::Error> {
		// An empty file holds no settings.
		if config.trim().is_empty() {
			return Ok(Config::default());
		}
		serde_yaml::from_str(config)
	}

	/// The tree options for this config. Settings the config leaves out take the values of [`default_tree_options`].
	pub fn tree_options(&self) -> TrainOptions {
		let defaults = default_tree_options();
		let tree = match self.tree.as_ref() {
			Some(tree) => tree,
			None => return defaults,
		};
		TrainOptions {
			compute_loss: tree.compute_loss.unwrap_or(defaults.compute_loss),
			l2_regularization: tree.l2_regularization.unwrap_or(defaults.l2_regularization),
			learning_rate: tree.learning_rate.unwrap_or(defaults.learning_rate),
			max_depth: tree.max_depth.unwrap_or(defaults.max_depth),
			max_leaf_nodes: tree.max_leaf_nodes.unwrap_or(defaults.max_leaf_nodes),
			max_rounds: tree.max_rounds.unwrap_or(defaults.max_rounds),
			max_valid_bins_for_number_features: tree
				.max_valid_bins_for_number_features
				.unwrap_or(defaults.max_valid_bins_for_number_features),
			min_examples_per_child: tree
				.min_examples_per_child
				.unwrap_or(defaults.min_examples_per_child),
			min_gain_to_split: tree.min_gain_to_split.unwrap_or(defaults.min_gain_to_split),
			min_sum_hessians_per_child: tree
				.min_sum_hessians_per_child
				.unwrap_or(defaults.min_sum_hessians_per_child),
			..defaults
		}
	}
}

/// The tree options the workflow trains with unless configured otherwise: 100 rounds of trees with at most 20 leaves and 10 examples per leaf, at a learning rate of 0.2.
pub fn default_tree_options() -> TrainOptions {
	TrainOptions {
		compute_loss: true,
		learning_rate: 0.2,
		max_leaf_nodes: 20,
		max_rounds: 100,
		min_examples_per_child: 10,
		..Default::default()
	}
}

/// Process-wide settings, created once and passed by reference to every step that needs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
	pub seed: u64,
}

impl Default for Context {
	fn default() -> Self {
		Context { seed: DEFAULT_SEED }
	}
}

#[test]
fn test_tree_options_override_defaults() {
	let config = Config::from_str(
		"
seed: 7
tree:
  learning_rate: 0.05
  max_rounds: 3
",
	)
	.unwrap();
	assert_eq!(config.seed, Some(7));
	let options = config.tree_options();
	assert_eq!(options.learning_rate, 0.05);
	assert_eq!(options.max_rounds, 3);
	assert_eq!(options.max_leaf_nodes, 20);
	assert_eq!(options.min_examples_per_child, 10);
}

#[test]
fn test_empty_config() {
	let config = Config::from_str("").unwrap();
	assert_eq!(config.tree_options(), default_tree_options());
	assert!(config.seed.is_none());
}

#[test]
fn test_malformed_config_names_the_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config.yaml");
	std::fs::write(&path, "seed: [1, 2").unwrap();
	let error = Config::from_path(&path).unwrap_err();
	assert_eq!(
		error.to_string(),
		format!("failed to parse config file {}", path.display())
	);
}
