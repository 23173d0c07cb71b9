/*!
This crate implements gradient boosted regression trees. Like [LightGBM](https://github.com/microsoft/lightgbm), features are binned before training, split candidates are found from per-bin gradient histograms, and each tree is grown leaf-wise, always splitting the leaf with the largest gain next.

Features are dense `f32` matrices with one row per example. `NaN` marks an invalid value.
*/

#![allow(clippy::tabs_in_doc_comments)]

use ndarray::prelude::*;

mod bin_stats;
mod binning;
mod feature_importances;
mod regressor;
mod split;
mod train;
mod train_tree;

pub use regressor::Regressor;

/// These are the options passed to `Regressor::train`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrainOptions {
	/// If true, the model will include the loss on the training data after each round.
	pub compute_loss: bool,
	/// This option sets the L2 regularization value, which helps avoid overfitting.
	pub l2_regularization: f32,
	/// The learning rate scales the leaf values to control the effect each tree has on the output.
	pub learning_rate: f32,
	/// The depth of a single tree will never exceed this value.
	pub max_depth: usize,
	/// The number of leaf nodes in a single tree will never exceed this value.
	pub max_leaf_nodes: usize,
	/// When computing the bin thresholds for number features, this is the maximum number of bins for valid values to create. If the number of unique values in the number feature is less than this value, the thresholds will be the midpoints between the unique values.
	pub max_valid_bins_for_number_features: u8,
	/// This is the number of rounds of training that will occur. Each round trains one tree.
	pub max_rounds: usize,
	/// A split will only be considered valid if the number of training examples sent to each of the resulting children is at least this value.
	pub min_examples_per_child: usize,
	/// A node will only be split if the best split achieves at least this minimum gain.
	pub min_gain_to_split: f32,
	/// A split will only be considered valid if the sum of hessians in each of the resulting children is at least this value.
	pub min_sum_hessians_per_child: f32,
	/// This is the maximum number of examples to consider when determining the bin thresholds for number features.
	pub max_examples_for_computing_bin_thresholds: usize,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			compute_loss: false,
			l2_regularization: 0.0,
			learning_rate: 0.1,
			max_depth: 5,
			max_leaf_nodes: 31,
			max_rounds: 100,
			max_valid_bins_for_number_features: 255,
			min_examples_per_child: 20,
			min_gain_to_split: 0.0,
			min_sum_hessians_per_child: 1e-3,
			max_examples_for_computing_bin_thresholds: 200_000,
		}
	}
}

/// This struct reports the training progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrainProgress {
	Initializing,
	Training { round_index: usize, n_rounds: usize },
}

/// Trees are stored as a `Vec` of `Node`s. Each branch in the tree has two indexes into the `Vec`, one for each of its children.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Make a prediction for a given example.
	pub fn predict(&self, features: ArrayView1<f32>) -> f32 {
		// Start at the root node.
		let mut node_index = 0;
		// Traverse the tree until we get to a leaf.
		loop {
			match &self.nodes[node_index] {
				Node::Branch(BranchNode {
					left_child_index,
					right_child_index,
					split,
					..
				}) => {
					node_index = match split.direction(features[split.feature_index]) {
						SplitDirection::Left => *left_child_index,
						SplitDirection::Right => *right_child_index,
					};
				}
				// We made it to a leaf! The prediction is the leaf's value.
				Node::Leaf(LeafNode { value, .. }) => return *value,
			}
		}
	}
}

/// A node is either a branch or a leaf.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

impl Node {
	pub fn examples_fraction(&self) -> f32 {
		match self {
			Self::Leaf(LeafNode {
				examples_fraction, ..
			}) => *examples_fraction,
			Self::Branch(BranchNode {
				examples_fraction, ..
			}) => *examples_fraction,
		}
	}
}

/// A `BranchNode` is a branch in a tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BranchNode {
	/// This is the index in the tree's node vector for this node's left child.
	pub left_child_index: usize,
	/// This is the index in the tree's node vector for this node's right child.
	pub right_child_index: usize,
	/// When making predictions, an example will be sent either to the right or left child. The `split` contains the information necessary to determine which way it will go.
	pub split: BranchSplit,
	/// Branch nodes store the fraction of training examples that passed through them during training.
	pub examples_fraction: f32,
}

/// A split takes the value of a single number feature, compares it with a `split_value`, and if the value is <= `split_value`, the example is sent left, and if it is > `split_value`, it is sent right.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BranchSplit {
	/// This is the index of the feature to get the value for.
	pub feature_index: usize,
	/// This is the threshold value of the split.
	pub split_value: f32,
	/// This is the direction invalid values should be sent.
	pub invalid_values_direction: SplitDirection,
}

impl BranchSplit {
	pub fn direction(&self, value: f32) -> SplitDirection {
		if value.is_nan() {
			self.invalid_values_direction
		} else if value <= self.split_value {
			SplitDirection::Left
		} else {
			SplitDirection::Right
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SplitDirection {
	Left,
	Right,
}

/// The leaves in a tree hold the values to output for examples that get sent to them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LeafNode {
	/// This is the value to output.
	pub value: f32,
	/// Leaf nodes store the fraction of training examples that were sent to them during training.
	pub examples_fraction: f32,
}

#[test]
fn test_tree_predict() {
	let tree = Tree {
		nodes: vec![
			Node::Branch(BranchNode {
				left_child_index: 1,
				right_child_index: 2,
				split: BranchSplit {
					feature_index: 1,
					split_value: 0.5,
					invalid_values_direction: SplitDirection::Right,
				},
				examples_fraction: 1.0,
			}),
			Node::Leaf(LeafNode {
				value: -1.0,
				examples_fraction: 0.5,
			}),
			Node::Leaf(LeafNode {
				value: 1.0,
				examples_fraction: 0.5,
			}),
		],
	};
	assert_eq!(tree.predict(arr1(&[9.0, 0.5]).view()), -1.0);
	assert_eq!(tree.predict(arr1(&[9.0, 0.6]).view()), 1.0);
	assert_eq!(tree.predict(arr1(&[9.0, f32::NAN]).view()), 1.0);
}
