use crate::train_tree::{TrainTree, TrainTreeBranchNode, TrainTreeNode};

/// This function computes feature importances using the "split" method, where a feature's importance is proportional to the number of nodes that use it to split. If no tree has a branch, every importance is zero.
pub fn compute_feature_importances(trees: &[TrainTree], n_features: usize) -> Vec<f32> {
	let mut feature_importances = vec![0.0; n_features];
	for tree in trees.iter() {
		tree.nodes.iter().for_each(|node| match node {
			TrainTreeNode::Branch(TrainTreeBranchNode { split, .. }) => {
				feature_importances[split.feature_index] += 1.0;
			}
			TrainTreeNode::Leaf(_) => {}
		});
	}
	// Normalize the feature_importances.
	let total: f32 = feature_importances.iter().sum();
	if total > 0.0 {
		for feature_importance in feature_importances.iter_mut() {
			*feature_importance /= total;
		}
	}
	feature_importances
}
