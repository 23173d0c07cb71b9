use crate::TrainOptions;
use itertools::Itertools;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rayon::prelude::*;
use std::cmp::Ordering;

/*
This struct specifies how to bin a feature. The first bin is reserved for invalid values, which are `NaN`s, and after that feature values are binned by comparing them with a set of thresholds. For example, given the thresholds `[0.5, 1.5, 2]`, the bins will be:
0. invalid values
1. (-infinity, 0.5]
2. (0.5, 1.5]
3. (1.5, 2]
4. (2, infinity)
*/
#[derive(Clone, Debug, PartialEq)]
pub struct BinningInstruction {
	pub thresholds: Vec<f32>,
}

impl BinningInstruction {
	pub fn n_bins(&self) -> usize {
		1 + self.n_valid_bins()
	}

	pub fn n_valid_bins(&self) -> usize {
		self.thresholds.len() + 1
	}

	pub fn bin(&self, value: f32) -> u8 {
		// Infinities fall in the outermost valid bins, matching how `BranchSplit::direction` routes them.
		if value.is_nan() {
			0
		} else {
			let index = self.thresholds.partition_point(|threshold| *threshold < value);
			(index + 1).to_u8().unwrap_or(u8::MAX)
		}
	}
}

/// Compute the binning instructions for each column in `features`.
pub fn compute_binning_instructions(
	features: ArrayView2<f32>,
	train_options: &TrainOptions,
) -> Vec<BinningInstruction> {
	(0..features.ncols())
		.into_par_iter()
		.map(|feature_index| {
			compute_binning_instruction_for_feature(features.column(feature_index), train_options)
		})
		.collect()
}

fn compute_binning_instruction_for_feature(
	column: ArrayView1<f32>,
	train_options: &TrainOptions,
) -> BinningInstruction {
	// Create a histogram of values in the feature.
	let mut values: Vec<f32> = column
		.iter()
		.take(train_options.max_examples_for_computing_bin_thresholds)
		.cloned()
		.filter(|value| value.is_finite())
		.collect();
	values.sort_by(|a, b| a.total_cmp(b));
	let histogram: Vec<(f32, usize)> = values
		.iter()
		.dedup_with_count()
		.map(|(count, value)| (*value, count))
		.collect();
	let max_valid_bins = train_options.max_valid_bins_for_number_features.to_usize().unwrap_or(255);
	// If the number of unique values is less than `max_valid_bins_for_number_features`, then create one bin per unique value. Otherwise, create bins at quantiles.
	let thresholds = if histogram.len() < max_valid_bins {
		histogram
			.iter()
			.tuple_windows()
			.map(|((a, _), (b, _))| (a + b) / 2.0)
			.collect()
	} else {
		compute_thresholds_as_quantiles(&histogram, values.len(), max_valid_bins)
	};
	BinningInstruction { thresholds }
}

/// Compute thresholds at evenly spaced quantiles of the histogram. Repeated quantiles collapse into one threshold.
fn compute_thresholds_as_quantiles(
	histogram: &[(f32, usize)],
	values_count: usize,
	max_valid_bins: usize,
) -> Vec<f32> {
	let total_values_count = values_count.to_f32().unwrap_or(0.0);
	let quantile_positions: Vec<(usize, f32)> = (1..max_valid_bins)
		.map(|i| {
			let position =
				(total_values_count - 1.0) * i.to_f32().unwrap() / max_valid_bins.to_f32().unwrap();
			(position.trunc().to_usize().unwrap_or(0), position.fract())
		})
		.collect();
	let mut quantiles: Vec<Option<f32>> = vec![None; quantile_positions.len()];
	let mut current_count: usize = 0;
	let mut iter = histogram.iter().peekable();
	while let Some((value, count)) = iter.next() {
		current_count += count;
		let next_value = iter.peek().map(|(next_value, _)| *next_value);
		for (quantile, (index, fract)) in quantiles
			.iter_mut()
			.zip(quantile_positions.iter())
			.filter(|(quantile, _)| quantile.is_none())
		{
			match (current_count - 1).cmp(index) {
				Ordering::Equal => {
					*quantile = Some(match next_value {
						Some(next_value) if *fract > 0.0 => value * (1.0 - fract) + next_value * fract,
						_ => *value,
					});
				}
				Ordering::Greater => *quantile = Some(*value),
				Ordering::Less => {}
			}
		}
	}
	quantiles.into_iter().flatten().dedup().collect()
}

/// Features binned column by column. Each value is the index of the bin the feature value falls in.
#[derive(Debug)]
pub struct BinnedFeatures {
	pub columns: Vec<Vec<u8>>,
}

/// Compute the binned features based on the binning instructions.
pub fn compute_binned_features(
	features: ArrayView2<f32>,
	binning_instructions: &[BinningInstruction],
) -> BinnedFeatures {
	let columns = binning_instructions
		.par_iter()
		.enumerate()
		.map(|(feature_index, binning_instruction)| {
			features
				.column(feature_index)
				.iter()
				.map(|value| binning_instruction.bin(*value))
				.collect()
		})
		.collect();
	BinnedFeatures { columns }
}

#[test]
fn test_binning_with_few_unique_values() {
	let features = arr2(&[[1.0], [3.0], [f32::NAN], [3.0], [2.0]]);
	let options = TrainOptions::default();
	let instructions = compute_binning_instructions(features.view(), &options);
	assert_eq!(instructions[0].thresholds, vec![1.5, 2.5]);
	let binned = compute_binned_features(features.view(), &instructions);
	assert_eq!(binned.columns[0], vec![1, 3, 0, 3, 2]);
}

#[test]
fn test_binning_with_quantiles() {
	let values: Vec<f32> = (0..100).map(|i| i as f32).collect();
	let features = Array::from_shape_vec((100, 1), values).unwrap();
	let options = TrainOptions {
		max_valid_bins_for_number_features: 4,
		..Default::default()
	};
	let instructions = compute_binning_instructions(features.view(), &options);
	assert_eq!(instructions[0].thresholds, vec![24.75, 49.5, 74.25]);
	assert_eq!(instructions[0].n_bins(), 5);
	assert_eq!(instructions[0].bin(24.75), 1);
	assert_eq!(instructions[0].bin(25.0), 2);
	assert_eq!(instructions[0].bin(99.0), 4);
	assert_eq!(instructions[0].bin(f32::NAN), 0);
	assert_eq!(instructions[0].bin(f32::INFINITY), 4);
	assert_eq!(instructions[0].bin(f32::NEG_INFINITY), 1);
}
