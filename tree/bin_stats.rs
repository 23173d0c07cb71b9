use crate::binning::{BinnedFeatures, BinningInstruction};
use itertools::izip;
use rayon::prelude::*;

/// For each feature, the sums of the gradients and hessians of the examples that fall in each bin.
#[derive(Clone, Debug)]
pub struct BinStats {
	pub entries: Vec<Vec<BinStatsEntry>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinStatsEntry {
	pub sum_gradients: f64,
	pub sum_hessians: f64,
	pub count: usize,
}

impl BinStats {
	/// Compute the bin stats for the examples in `examples_index`.
	pub fn compute(
		binning_instructions: &[BinningInstruction],
		binned_features: &BinnedFeatures,
		gradients: &[f32],
		hessians: &[f32],
		examples_index: &[usize],
	) -> Self {
		let entries = binning_instructions
			.par_iter()
			.zip(binned_features.columns.par_iter())
			.map(|(binning_instruction, binned_feature_values)| {
				let mut entries = vec![BinStatsEntry::default(); binning_instruction.n_bins()];
				for example_index in examples_index {
					let bin_index = binned_feature_values[*example_index] as usize;
					let entry = &mut entries[bin_index];
					entry.sum_gradients += gradients[*example_index] as f64;
					entry.sum_hessians += hessians[*example_index] as f64;
					entry.count += 1;
				}
				entries
			})
			.collect();
		Self { entries }
	}

	/// Compute the bin stats of a node's sibling by subtracting this node's bin stats from their parent's.
	pub fn subtract_from(&self, parent: &BinStats) -> BinStats {
		let entries = izip!(&parent.entries, &self.entries)
			.map(|(parent_entries, entries)| {
				izip!(parent_entries, entries)
					.map(|(parent_entry, entry)| BinStatsEntry {
						sum_gradients: parent_entry.sum_gradients - entry.sum_gradients,
						sum_hessians: parent_entry.sum_hessians - entry.sum_hessians,
						count: parent_entry.count - entry.count,
					})
					.collect()
			})
			.collect();
		BinStats { entries }
	}
}

#[test]
fn test_subtraction_matches_direct_computation() {
	use crate::binning::{compute_binned_features, compute_binning_instructions};
	use ndarray::prelude::*;
	let features = arr2(&[[1.0, 5.0], [2.0, 6.0], [3.0, 5.0], [1.0, 6.0]]);
	let options = crate::TrainOptions::default();
	let instructions = compute_binning_instructions(features.view(), &options);
	let binned = compute_binned_features(features.view(), &instructions);
	let gradients = [0.5, -1.0, 2.0, 0.25];
	let hessians = [1.0; 4];
	let parent = BinStats::compute(&instructions, &binned, &gradients, &hessians, &[0, 1, 2, 3]);
	let left = BinStats::compute(&instructions, &binned, &gradients, &hessians, &[0, 3]);
	let right = BinStats::compute(&instructions, &binned, &gradients, &hessians, &[1, 2]);
	assert_eq!(left.subtract_from(&parent).entries, right.entries);
}
