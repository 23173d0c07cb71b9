use crate::{bin_stats::BinStats, binning::BinningInstruction, SplitDirection, TrainOptions};
use num_traits::ToPrimitive;

#[derive(Clone, Debug, PartialEq)]
pub struct TrainBranchSplit {
	pub feature_index: usize,
	pub split_value: f32,
	/// Examples whose bin index is less than or equal to this value go left.
	pub bin_index: u8,
	pub invalid_values_direction: SplitDirection,
}

#[derive(Clone, Debug)]
pub struct ChooseBestSplitOutput {
	pub gain: f32,
	pub split: TrainBranchSplit,
	pub left_n_examples: usize,
	pub left_sum_gradients: f64,
	pub left_sum_hessians: f64,
	pub right_n_examples: usize,
	pub right_sum_gradients: f64,
	pub right_sum_hessians: f64,
}

/// Find the split with the highest gain across all features. Ties go to the lowest feature index, then the lowest threshold.
pub fn choose_best_split(
	bin_stats: &BinStats,
	binning_instructions: &[BinningInstruction],
	sum_gradients: f64,
	sum_hessians: f64,
	train_options: &TrainOptions,
) -> Option<ChooseBestSplitOutput> {
	let mut best: Option<ChooseBestSplitOutput> = None;
	for (feature_index, (binning_instruction, entries)) in binning_instructions
		.iter()
		.zip(bin_stats.entries.iter())
		.enumerate()
	{
		let candidate = choose_best_split_for_feature(
			feature_index,
			binning_instruction,
			entries,
			sum_gradients,
			sum_hessians,
			train_options,
		);
		if let Some(candidate) = candidate {
			let is_better = best
				.as_ref()
				.map(|best| candidate.gain > best.gain)
				.unwrap_or(true);
			if is_better {
				best = Some(candidate);
			}
		}
	}
	best
}

fn choose_best_split_for_feature(
	feature_index: usize,
	binning_instruction: &BinningInstruction,
	entries: &[crate::bin_stats::BinStatsEntry],
	sum_gradients: f64,
	sum_hessians: f64,
	train_options: &TrainOptions,
) -> Option<ChooseBestSplitOutput> {
	let l2_regularization = train_options.l2_regularization as f64;
	let n_examples: usize = entries.iter().map(|entry| entry.count).sum();
	let negative_loss_parent = compute_negative_loss(sum_gradients, sum_hessians, l2_regularization);
	let invalid_values_direction = if entries[0].count > 0 {
		SplitDirection::Left
	} else {
		SplitDirection::Right
	};
	let mut best: Option<ChooseBestSplitOutput> = None;
	// Invalid values are in bin 0, which always goes left.
	let mut left_n_examples = 0;
	let mut left_sum_gradients = 0.0;
	let mut left_sum_hessians = 0.0;
	for (bin_index, entry) in entries.iter().enumerate().take(entries.len() - 1) {
		left_n_examples += entry.count;
		left_sum_gradients += entry.sum_gradients;
		left_sum_hessians += entry.sum_hessians;
		// The first valid split is after bin 1.
		if bin_index == 0 {
			continue;
		}
		let right_n_examples = n_examples - left_n_examples;
		let right_sum_gradients = sum_gradients - left_sum_gradients;
		let right_sum_hessians = sum_hessians - left_sum_hessians;
		if left_n_examples < train_options.min_examples_per_child
			|| right_n_examples < train_options.min_examples_per_child
		{
			continue;
		}
		let min_sum_hessians = train_options.min_sum_hessians_per_child as f64;
		if left_sum_hessians < min_sum_hessians || right_sum_hessians < min_sum_hessians {
			continue;
		}
		let gain = compute_negative_loss(left_sum_gradients, left_sum_hessians, l2_regularization)
			+ compute_negative_loss(right_sum_gradients, right_sum_hessians, l2_regularization)
			- negative_loss_parent;
		let gain = gain.to_f32().unwrap_or(f32::NAN);
		if !gain.is_finite() || gain <= train_options.min_gain_to_split {
			continue;
		}
		if best.as_ref().map(|best| gain > best.gain).unwrap_or(true) {
			best = Some(ChooseBestSplitOutput {
				gain,
				split: TrainBranchSplit {
					feature_index,
					split_value: binning_instruction.thresholds[bin_index - 1],
					bin_index: bin_index.to_u8().unwrap_or(u8::MAX),
					invalid_values_direction,
				},
				left_n_examples,
				left_sum_gradients,
				left_sum_hessians,
				right_n_examples,
				right_sum_gradients,
				right_sum_hessians,
			});
		}
	}
	best
}

/// The negative loss of a node is G^2 / (H + lambda).
fn compute_negative_loss(sum_gradients: f64, sum_hessians: f64, l2_regularization: f64) -> f64 {
	(sum_gradients * sum_gradients) / (sum_hessians + l2_regularization)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::bin_stats::BinStatsEntry;

	fn entry(sum_gradients: f64, count: usize) -> BinStatsEntry {
		BinStatsEntry {
			sum_gradients,
			sum_hessians: count as f64,
			count,
		}
	}

	#[test]
	fn test_choose_best_split() {
		let binning_instructions = vec![
			BinningInstruction {
				thresholds: vec![1.5, 2.5],
			},
			BinningInstruction {
				thresholds: vec![10.0],
			},
		];
		let bin_stats = BinStats {
			entries: vec![
				vec![entry(0.0, 0), entry(-2.0, 2), entry(-2.0, 2), entry(4.0, 2)],
				vec![entry(0.0, 0), entry(-1.0, 3), entry(1.0, 3)],
			],
		};
		let options = TrainOptions {
			min_examples_per_child: 1,
			..Default::default()
		};
		let output = choose_best_split(&bin_stats, &binning_instructions, 0.0, 6.0, &options).unwrap();
		assert_eq!(output.split.feature_index, 0);
		assert_eq!(output.split.split_value, 2.5);
		assert_eq!(output.split.bin_index, 2);
		assert_eq!(output.split.invalid_values_direction, SplitDirection::Right);
		assert_eq!(output.left_n_examples, 4);
		assert_eq!(output.right_n_examples, 2);
		assert_eq!(output.gain, 12.0);
	}

	#[test]
	fn test_no_split_for_constant_feature() {
		let binning_instructions = vec![BinningInstruction { thresholds: vec![] }];
		let bin_stats = BinStats {
			entries: vec![vec![entry(0.0, 0), entry(3.0, 6)]],
		};
		let options = TrainOptions::default();
		assert!(choose_best_split(&bin_stats, &binning_instructions, 3.0, 6.0, &options).is_none());
	}
}
