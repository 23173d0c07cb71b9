use crate::{
	bin_stats::BinStats,
	binning::{BinnedFeatures, BinningInstruction},
	split::{choose_best_split, ChooseBestSplitOutput, TrainBranchSplit},
	BranchNode, BranchSplit, LeafNode, Node, SplitDirection, TrainOptions, Tree,
};
use num_traits::ToPrimitive;
use std::{cmp::Ordering, collections::BinaryHeap, ops::Range};

#[derive(Debug)]
pub struct TrainTree {
	pub nodes: Vec<TrainTreeNode>,
}

#[derive(Debug)]
pub enum TrainTreeNode {
	Branch(TrainTreeBranchNode),
	Leaf(TrainTreeLeafNode),
}

impl TrainTreeNode {
	pub fn as_branch_mut(&mut self) -> Option<&mut TrainTreeBranchNode> {
		match self {
			TrainTreeNode::Branch(s) => Some(s),
			_ => None,
		}
	}
}

#[derive(Debug)]
pub struct TrainTreeBranchNode {
	pub left_child_index: Option<usize>,
	pub right_child_index: Option<usize>,
	pub split: TrainBranchSplit,
	pub examples_fraction: f32,
}

#[derive(Debug)]
pub struct TrainTreeLeafNode {
	pub value: f32,
	pub examples_fraction: f32,
}

struct QueueItem {
	/// Items in the priority queue will be sorted by the gain of the split.
	gain: f32,
	split_output: ChooseBestSplitOutput,
	/// The queue item holds a reference to its parent so that it can update the parent's left or right child index if the queue item becomes a node added to the tree.
	parent_index: Option<usize>,
	/// Will this node be a left or right child of its parent?
	split_direction: Option<SplitDirection>,
	depth: usize,
	bin_stats: BinStats,
	/// The range of the examples index that holds the examples in this node.
	examples_index_range: Range<usize>,
}

impl PartialEq for QueueItem {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for QueueItem {
	fn cmp(&self, other: &Self) -> Ordering {
		self.gain
			.total_cmp(&other.gain)
			// Among equal gains, the node created first is split first.
			.then_with(|| other.examples_index_range.start.cmp(&self.examples_index_range.start))
	}
}

/// The output of training a single tree: the tree and, for each leaf, the range of the examples index it holds and the value it outputs. The leaf values are used to update the predictions.
pub struct TrainTreeOutput {
	pub tree: TrainTree,
	pub leaf_values: Vec<(Range<usize>, f32)>,
}

/// Train a tree on the examples in `examples_index`, which is rearranged so each leaf's examples are contiguous.
pub fn train_tree(
	binning_instructions: &[BinningInstruction],
	binned_features: &BinnedFeatures,
	gradients: &[f32],
	hessians: &[f32],
	examples_index: &mut [usize],
	train_options: &TrainOptions,
) -> TrainTreeOutput {
	let n_examples_root = examples_index.len();
	let mut nodes = Vec::new();
	let mut leaf_values = Vec::new();
	let mut queue: BinaryHeap<QueueItem> = BinaryHeap::new();
	let sum_gradients_root: f64 = examples_index.iter().map(|i| gradients[*i] as f64).sum();
	let sum_hessians_root: f64 = examples_index.iter().map(|i| hessians[*i] as f64).sum();
	let root = NodeCandidate {
		parent_index: None,
		split_direction: None,
		depth: 0,
		examples_index_range: 0..n_examples_root,
		sum_gradients: sum_gradients_root,
		sum_hessians: sum_hessians_root,
	};
	if root_can_split(n_examples_root, train_options) {
		let bin_stats = BinStats::compute(
			binning_instructions,
			binned_features,
			gradients,
			hessians,
			examples_index,
		);
		enqueue_or_add_leaf(
			root,
			bin_stats,
			binning_instructions,
			&mut queue,
			&mut nodes,
			&mut leaf_values,
			n_examples_root,
			train_options,
		);
	} else {
		add_leaf(root, &mut nodes, &mut leaf_values, n_examples_root, train_options);
	}

	while let Some(queue_item) = queue.pop() {
		// Every item still in the queue will become at least a leaf, so this item can only be split if there is room for one more.
		let n_leaf_nodes = leaf_values.len() + queue.len() + 1;
		let split_output = queue_item.split_output;
		if n_leaf_nodes >= train_options.max_leaf_nodes {
			add_leaf(
				NodeCandidate {
					parent_index: queue_item.parent_index,
					split_direction: queue_item.split_direction,
					depth: queue_item.depth,
					examples_index_range: queue_item.examples_index_range,
					sum_gradients: split_output.left_sum_gradients + split_output.right_sum_gradients,
					sum_hessians: split_output.left_sum_hessians + split_output.right_sum_hessians,
				},
				&mut nodes,
				&mut leaf_values,
				n_examples_root,
				train_options,
			);
			continue;
		}

		// Add the branch to the tree.
		let node_index = nodes.len();
		let range = queue_item.examples_index_range;
		nodes.push(TrainTreeNode::Branch(TrainTreeBranchNode {
			left_child_index: None,
			right_child_index: None,
			split: split_output.split.clone(),
			examples_fraction: examples_fraction(range.len(), n_examples_root),
		}));
		set_child_index(
			&mut nodes,
			queue_item.parent_index,
			queue_item.split_direction,
			node_index,
		);

		// Rearrange the examples so those that go left come before those that go right.
		let n_left = rearrange_examples_index(
			&mut examples_index[range.clone()],
			&binned_features.columns[split_output.split.feature_index],
			split_output.split.bin_index,
		);
		let left_range = range.start..range.start + n_left;
		let right_range = range.start + n_left..range.end;
		let depth = queue_item.depth + 1;
		let left = NodeCandidate {
			parent_index: Some(node_index),
			split_direction: Some(SplitDirection::Left),
			depth,
			examples_index_range: left_range,
			sum_gradients: split_output.left_sum_gradients,
			sum_hessians: split_output.left_sum_hessians,
		};
		let right = NodeCandidate {
			parent_index: Some(node_index),
			split_direction: Some(SplitDirection::Right),
			depth,
			examples_index_range: right_range,
			sum_gradients: split_output.right_sum_gradients,
			sum_hessians: split_output.right_sum_hessians,
		};
		let left_can_split = child_can_split(&left, train_options);
		let right_can_split = child_can_split(&right, train_options);
		if !left_can_split && !right_can_split {
			add_leaf(left, &mut nodes, &mut leaf_values, n_examples_root, train_options);
			add_leaf(right, &mut nodes, &mut leaf_values, n_examples_root, train_options);
			continue;
		}

		// Compute the bin stats for the child with fewer examples and get the other's by subtracting from the parent.
		let (smaller, larger) = if left.examples_index_range.len() <= right.examples_index_range.len() {
			(&left, &right)
		} else {
			(&right, &left)
		};
		let smaller_bin_stats = BinStats::compute(
			binning_instructions,
			binned_features,
			gradients,
			hessians,
			&examples_index[smaller.examples_index_range.clone()],
		);
		let larger_bin_stats = smaller_bin_stats.subtract_from(&queue_item.bin_stats);
		let (left_bin_stats, right_bin_stats) = if larger.split_direction == right.split_direction {
			(smaller_bin_stats, larger_bin_stats)
		} else {
			(larger_bin_stats, smaller_bin_stats)
		};
		for (child, child_can_split, child_bin_stats) in [
			(left, left_can_split, left_bin_stats),
			(right, right_can_split, right_bin_stats),
		] {
			if child_can_split {
				enqueue_or_add_leaf(
					child,
					child_bin_stats,
					binning_instructions,
					&mut queue,
					&mut nodes,
					&mut leaf_values,
					n_examples_root,
					train_options,
				);
			} else {
				add_leaf(child, &mut nodes, &mut leaf_values, n_examples_root, train_options);
			}
		}
	}

	TrainTreeOutput {
		tree: TrainTree { nodes },
		leaf_values,
	}
}

/// A node that has not yet been added to the tree.
struct NodeCandidate {
	parent_index: Option<usize>,
	split_direction: Option<SplitDirection>,
	depth: usize,
	examples_index_range: Range<usize>,
	sum_gradients: f64,
	sum_hessians: f64,
}

fn root_can_split(n_examples: usize, train_options: &TrainOptions) -> bool {
	train_options.max_depth > 0
		&& train_options.max_leaf_nodes > 1
		&& n_examples >= 2 * train_options.min_examples_per_child
}

fn child_can_split(child: &NodeCandidate, train_options: &TrainOptions) -> bool {
	child.depth < train_options.max_depth
		&& child.examples_index_range.len() >= 2 * train_options.min_examples_per_child
}

#[allow(clippy::too_many_arguments)]
fn enqueue_or_add_leaf(
	candidate: NodeCandidate,
	bin_stats: BinStats,
	binning_instructions: &[BinningInstruction],
	queue: &mut BinaryHeap<QueueItem>,
	nodes: &mut Vec<TrainTreeNode>,
	leaf_values: &mut Vec<(Range<usize>, f32)>,
	n_examples_root: usize,
	train_options: &TrainOptions,
) {
	match choose_best_split(
		&bin_stats,
		binning_instructions,
		candidate.sum_gradients,
		candidate.sum_hessians,
		train_options,
	) {
		Some(split_output) => queue.push(QueueItem {
			gain: split_output.gain,
			split_output,
			parent_index: candidate.parent_index,
			split_direction: candidate.split_direction,
			depth: candidate.depth,
			bin_stats,
			examples_index_range: candidate.examples_index_range,
		}),
		None => add_leaf(candidate, nodes, leaf_values, n_examples_root, train_options),
	}
}

fn add_leaf(
	candidate: NodeCandidate,
	nodes: &mut Vec<TrainTreeNode>,
	leaf_values: &mut Vec<(Range<usize>, f32)>,
	n_examples_root: usize,
	train_options: &TrainOptions,
) {
	let value = compute_leaf_value(candidate.sum_gradients, candidate.sum_hessians, train_options);
	let node_index = nodes.len();
	nodes.push(TrainTreeNode::Leaf(TrainTreeLeafNode {
		value,
		examples_fraction: examples_fraction(candidate.examples_index_range.len(), n_examples_root),
	}));
	set_child_index(nodes, candidate.parent_index, candidate.split_direction, node_index);
	leaf_values.push((candidate.examples_index_range, value));
}

fn set_child_index(
	nodes: &mut [TrainTreeNode],
	parent_index: Option<usize>,
	split_direction: Option<SplitDirection>,
	node_index: usize,
) {
	if let Some(parent) = parent_index.and_then(|parent_index| nodes[parent_index].as_branch_mut())
	{
		match split_direction {
			Some(SplitDirection::Left) => parent.left_child_index = Some(node_index),
			Some(SplitDirection::Right) => parent.right_child_index = Some(node_index),
			None => {}
		}
	}
}

/// The leaf value is -learning_rate * G / (H + lambda).
fn compute_leaf_value(sum_gradients: f64, sum_hessians: f64, train_options: &TrainOptions) -> f32 {
	let denominator = sum_hessians + train_options.l2_regularization as f64;
	if denominator <= f64::EPSILON {
		return 0.0;
	}
	(-train_options.learning_rate as f64 * sum_gradients / denominator)
		.to_f32()
		.unwrap_or(0.0)
}

fn examples_fraction(n_examples: usize, n_examples_root: usize) -> f32 {
	if n_examples_root == 0 {
		0.0
	} else {
		n_examples.to_f32().unwrap_or(0.0) / n_examples_root.to_f32().unwrap_or(1.0)
	}
}

/// Stably partition `examples_index` so examples with a bin index <= `bin_index` come first. Returns the number of examples that went left.
fn rearrange_examples_index(
	examples_index: &mut [usize],
	binned_feature_values: &[u8],
	bin_index: u8,
) -> usize {
	let (left, right): (Vec<usize>, Vec<usize>) = examples_index
		.iter()
		.partition(|example_index| binned_feature_values[**example_index] <= bin_index);
	let n_left = left.len();
	for (slot, example_index) in examples_index.iter_mut().zip(left.into_iter().chain(right)) {
		*slot = example_index;
	}
	n_left
}

impl From<TrainTree> for Tree {
	fn from(train_tree: TrainTree) -> Tree {
		let nodes = train_tree
			.nodes
			.into_iter()
			.map(|node| match node {
				TrainTreeNode::Branch(TrainTreeBranchNode {
					left_child_index,
					right_child_index,
					split,
					examples_fraction,
				}) => Node::Branch(BranchNode {
					left_child_index: left_child_index.unwrap(),
					right_child_index: right_child_index.unwrap(),
					split: BranchSplit {
						feature_index: split.feature_index,
						split_value: split.split_value,
						invalid_values_direction: split.invalid_values_direction,
					},
					examples_fraction,
				}),
				TrainTreeNode::Leaf(TrainTreeLeafNode {
					value,
					examples_fraction,
				}) => Node::Leaf(LeafNode {
					value,
					examples_fraction,
				}),
			})
			.collect();
		Tree { nodes }
	}
}

#[test]
fn test_rearrange_examples_index() {
	let mut examples_index = vec![0, 1, 2, 3, 4];
	let binned = vec![3, 1, 2, 1, 4];
	let n_left = rearrange_examples_index(&mut examples_index, &binned, 2);
	assert_eq!(n_left, 3);
	assert_eq!(examples_index, vec![1, 2, 3, 0, 4]);
}

#[test]
fn test_train_tree_respects_max_leaf_nodes() {
	use crate::binning::{compute_binned_features, compute_binning_instructions};
	use ndarray::prelude::*;
	let values: Vec<f32> = (0..64).map(|i| i as f32).collect();
	let features = Array::from_shape_vec((64, 1), values.clone()).unwrap();
	let gradients: Vec<f32> = values.iter().map(|v| -v).collect();
	let hessians = vec![1.0; 64];
	let options = TrainOptions {
		max_leaf_nodes: 4,
		min_examples_per_child: 2,
		learning_rate: 1.0,
		..Default::default()
	};
	let binning_instructions = compute_binning_instructions(features.view(), &options);
	let binned_features = compute_binned_features(features.view(), &binning_instructions);
	let mut examples_index: Vec<usize> = (0..64).collect();
	let output = train_tree(
		&binning_instructions,
		&binned_features,
		&gradients,
		&hessians,
		&mut examples_index,
		&options,
	);
	assert_eq!(output.leaf_values.len(), 4);
	let n_examples: usize = output.leaf_values.iter().map(|(range, _)| range.len()).sum();
	assert_eq!(n_examples, 64);
	let tree = Tree::from(output.tree);
	// Larger feature values have larger negative gradients, so they get larger leaf values.
	assert!(tree.predict(arr1(&[0.0]).view()) < tree.predict(arr1(&[63.0]).view()));
}
