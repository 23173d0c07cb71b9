use crate::{
	binning::{compute_binned_features, compute_binning_instructions},
	feature_importances::compute_feature_importances,
	regressor::{compute_bias, compute_gradients, compute_loss},
	train_tree::{train_tree, TrainTreeOutput},
	Regressor, TrainOptions, TrainProgress,
};
use ndarray::prelude::*;

/// Train a regressor by boosting `max_rounds` trees on the least squares loss. Training involves no randomness, so the same inputs always produce the same model.
pub fn train(
	features: ArrayView2<f32>,
	labels: ArrayView1<f32>,
	train_options: &TrainOptions,
	update_progress: &mut dyn FnMut(TrainProgress),
) -> Regressor {
	let n_examples = features.nrows();
	let n_features = features.ncols();

	// Determine how to bin each feature and compute the binned values.
	update_progress(TrainProgress::Initializing);
	let binning_instructions = compute_binning_instructions(features, train_options);
	let binned_features = compute_binned_features(features, &binning_instructions);

	// The first prediction for every example is the mean label.
	let bias = compute_bias(labels);
	let mut predictions = vec![bias; n_examples];
	let mut gradients = vec![0.0; n_examples];
	// Hessians are constant in least squares loss.
	let hessians = vec![1.0; n_examples];
	let mut examples_index: Vec<usize> = (0..n_examples).collect();
	let mut trees = Vec::with_capacity(train_options.max_rounds);
	let mut losses = if train_options.compute_loss {
		Some(Vec::with_capacity(train_options.max_rounds))
	} else {
		None
	};

	for round_index in 0..train_options.max_rounds {
		update_progress(TrainProgress::Training {
			round_index,
			n_rounds: train_options.max_rounds,
		});
		compute_gradients(&mut gradients, labels, &predictions);
		for (i, example_index) in examples_index.iter_mut().enumerate() {
			*example_index = i;
		}
		let TrainTreeOutput { tree, leaf_values } = train_tree(
			&binning_instructions,
			&binned_features,
			&gradients,
			&hessians,
			&mut examples_index,
			train_options,
		);
		// Every example in a leaf's range gets the leaf's value added to its prediction.
		for (range, value) in leaf_values {
			for example_index in &examples_index[range] {
				predictions[*example_index] += value;
			}
		}
		if let Some(losses) = losses.as_mut() {
			losses.push(compute_loss(labels, &predictions));
		}
		trees.push(tree);
	}

	let feature_importances = compute_feature_importances(&trees, n_features);
	Regressor {
		bias,
		trees: trees.into_iter().map(Into::into).collect(),
		feature_importances: Some(feature_importances),
		losses,
	}
}
