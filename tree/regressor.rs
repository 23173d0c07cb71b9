use crate::{train::train, TrainOptions, TrainProgress, Tree};
use itertools::izip;
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// `Regressor`s predict continuous target values, for example a security's rate of return.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Regressor {
	/// The initial prediction of the model given no trained trees. The bias is calculated using the mean value of the target column in the training dataset.
	pub bias: f32,
	/// The trees for this model.
	pub trees: Vec<Tree>,
	/// The importance of each feature as measured by the number of times the feature was used in a branch node.
	pub feature_importances: Option<Vec<f32>>,
	/// The training losses in each round of training this model.
	pub losses: Option<Vec<f32>>,
}

impl Regressor {
	/// Train a regressor.
	pub fn train(
		features: ArrayView2<f32>,
		labels: ArrayView1<f32>,
		train_options: &TrainOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> Regressor {
		train(features, labels, train_options, update_progress)
	}

	/// Make predictions.
	pub fn predict(&self, features: ArrayView2<f32>, mut predictions: ArrayViewMut1<f32>) {
		for (prediction, features) in izip!(predictions.iter_mut(), features.axis_iter(Axis(0))) {
			*prediction = self.predict_one(features);
		}
	}

	/// Make a prediction for a single example.
	pub fn predict_one(&self, features: ArrayView1<f32>) -> f32 {
		self.trees
			.iter()
			.fold(self.bias, |value, tree| value + tree.predict(features))
	}
}

/// Compute the bias for regression, which is the mean label. An empty label column has a bias of zero.
pub fn compute_bias(labels: ArrayView1<f32>) -> f32 {
	labels.mean().unwrap_or(0.0)
}

/// Compute the loss after each tree is trained.
pub fn compute_loss(labels: ArrayView1<f32>, predictions: &[f32]) -> f32 {
	if labels.is_empty() {
		return 0.0;
	}
	let mut loss = 0.0;
	for (label, prediction) in izip!(labels, predictions) {
		loss += 0.5 * (label - prediction).powi(2);
	}
	loss / labels.len().to_f32().unwrap_or(1.0)
}

/// Compute the gradients of the least squares loss.
pub fn compute_gradients(gradients: &mut [f32], labels: ArrayView1<f32>, predictions: &[f32]) {
	for (gradient, label, prediction) in izip!(gradients, labels, predictions) {
		*gradient = prediction - label;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn step_dataset() -> (Array2<f32>, Array1<f32>) {
		let n = 100;
		let features = Array::from_shape_fn((n, 2), |(i, j)| {
			if j == 0 {
				i as f32
			} else {
				(i % 7) as f32
			}
		});
		let labels = Array::from_shape_fn(n, |i| if i < 50 { 1.0 } else { 3.0 });
		(features, labels)
	}

	#[test]
	fn test_regressor_learns_a_step() {
		let (features, labels) = step_dataset();
		let options = TrainOptions {
			compute_loss: true,
			learning_rate: 0.5,
			max_rounds: 20,
			min_examples_per_child: 5,
			..Default::default()
		};
		let model = Regressor::train(features.view(), labels.view(), &options, &mut |_| {});
		assert_eq!(model.bias, 2.0);
		assert_eq!(model.trees.len(), 20);
		let losses = model.losses.as_ref().unwrap();
		assert!(losses.last().unwrap() < losses.first().unwrap());
		let mut predictions = Array::zeros(features.nrows());
		model.predict(features.view(), predictions.view_mut());
		assert!((predictions[0] - 1.0).abs() < 0.01);
		assert!((predictions[99] - 3.0).abs() < 0.01);
		assert_eq!(predictions[10], model.predict_one(features.row(10)));
		let feature_importances = model.feature_importances.as_ref().unwrap();
		assert!(feature_importances[0] > feature_importances[1]);
	}

	#[test]
	fn test_training_is_deterministic() {
		let (features, labels) = step_dataset();
		let options = TrainOptions {
			max_rounds: 5,
			min_examples_per_child: 5,
			..Default::default()
		};
		let a = Regressor::train(features.view(), labels.view(), &options, &mut |_| {});
		let b = Regressor::train(features.view(), labels.view(), &options, &mut |_| {});
		assert_eq!(a, b);
	}

	#[test]
	fn test_infinite_values_are_routed_as_in_training() {
		let features = Array::from_shape_fn((120, 1), |(i, _)| {
			if i < 100 {
				i as f32
			} else {
				f32::INFINITY
			}
		});
		let labels = Array::from_shape_fn(120, |i| if i < 100 { 1.0 } else { -5.0 });
		let options = TrainOptions {
			learning_rate: 1.0,
			max_rounds: 1,
			min_examples_per_child: 10,
			..Default::default()
		};
		let model = Regressor::train(features.view(), labels.view(), &options, &mut |_| {});
		let infinite = model.predict_one(arr1(&[f32::INFINITY]).view());
		assert_eq!(infinite, model.predict_one(arr1(&[99.0]).view()));
		assert!(infinite < 0.0);
		assert!(model.predict_one(arr1(&[0.0]).view()) > 0.0);
	}

	#[test]
	fn test_compute_loss() {
		let labels = arr1(&[1.0, 3.0]);
		assert_eq!(compute_loss(labels.view(), &[2.0, 2.0]), 0.5);
	}
}
