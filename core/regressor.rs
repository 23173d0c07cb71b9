/*!
The estimator is reached through two traits, so another family of regressor can replace the gradient boosted trees without changing how the workflow is sequenced.
*/

use crate::Context;
use ndarray::prelude::*;
use rrt_tree::{Regressor, TrainOptions, TrainProgress};

/// A `RegressionTrainer` fits a predictor to a feature matrix with one row per example.
pub trait RegressionTrainer {
	type Predictor: RegressionPredictor;
	fn fit(
		&self,
		context: &Context,
		features: ArrayView2<f32>,
		labels: ArrayView1<f32>,
	) -> Self::Predictor;
}

pub trait RegressionPredictor {
	fn predict(&self, features: ArrayView2<f32>) -> Array1<f32>;
}

/// Trains gradient boosted regression trees.
#[derive(Clone, Debug, Default)]
pub struct GbtRegressionTrainer {
	pub options: TrainOptions,
}

impl RegressionTrainer for GbtRegressionTrainer {
	type Predictor = Regressor;

	fn fit(
		&self,
		_context: &Context,
		features: ArrayView2<f32>,
		labels: ArrayView1<f32>,
	) -> Regressor {
		// Tree training does not sample, so the seed has no effect on it.
		Regressor::train(features, labels, &self.options, &mut |progress| {
			if let TrainProgress::Training {
				round_index,
				n_rounds,
			} = progress
			{
				tracing::debug!(round = round_index + 1, n_rounds, "training tree");
			}
		})
	}
}

impl RegressionPredictor for Regressor {
	fn predict(&self, features: ArrayView2<f32>) -> Array1<f32> {
		let mut predictions = Array::zeros(features.nrows());
		Regressor::predict(self, features, predictions.view_mut());
		predictions
	}
}
