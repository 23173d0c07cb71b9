/*!
Permutation feature importance measures how much the model's R² changes when the values of one feature are shuffled, which breaks the feature's relationship with the label while keeping its distribution.

The importance of each feature is computed for every slot of the `Features` vector. Names are then looked up by index in the column list of the transformed table, which has fewer entries than the vector has slots once categorical columns are one-hot encoded. Indexes past the end of the column list are reported as `OutOfRange`.
*/

use crate::{
	model::{features, labels, FittedModel},
	regressor::{RegressionPredictor, RegressionTrainer},
	Context, Error,
};
use ndarray::prelude::*;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rrt_dataframe::DataFrame;
use rrt_features::FeatureTable;
use rrt_metrics::{MeanVariance, RegressionMetrics, RegressionMetricsInput, StreamingMetric};

pub const OUT_OF_RANGE_NAME: &str = "OutOfRange";

/// The change in R² from permuting one feature, across all repetitions.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FeatureImportance {
	/// The mean of permuted R² minus baseline R². Important features have large negative values.
	pub mean: f64,
	pub standard_deviation: f64,
	pub standard_error: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RankedFeatureImportance {
	pub feature_index: usize,
	pub feature_name: String,
	pub importance: FeatureImportance,
}

/// Compute the permutation importance of every column of `features`. Each column is shuffled `permutation_count` times with a generator seeded from the context, so the result only depends on the inputs.
pub fn permutation_feature_importance(
	context: &Context,
	predictor: &impl RegressionPredictor,
	features: ArrayView2<f32>,
	labels: ArrayView1<f32>,
	permutation_count: usize,
) -> Vec<FeatureImportance> {
	let labels = labels.to_vec();
	let baseline = r_squared(&predictor.predict(features), &labels);
	let mut rng = Xoshiro256Plus::seed_from_u64(context.seed);
	let mut permuted_features = features.to_owned();
	(0..features.ncols())
		.map(|feature_index| {
			let original: Vec<f32> = features.column(feature_index).to_vec();
			let mut shuffled = original.clone();
			let mut delta = MeanVariance::default();
			for _ in 0..permutation_count {
				shuffled.shuffle(&mut rng);
				permuted_features
					.column_mut(feature_index)
					.assign(&ArrayView1::from(&shuffled));
				let permuted = r_squared(&predictor.predict(permuted_features.view()), &labels);
				delta.update(permuted - baseline);
			}
			// Restore the column before permuting the next one.
			permuted_features
				.column_mut(feature_index)
				.assign(&ArrayView1::from(&original));
			match delta.finalize() {
				Some(output) => FeatureImportance {
					mean: output.mean,
					standard_deviation: output.sample_standard_deviation(),
					standard_error: output.standard_error(),
				},
				None => FeatureImportance {
					mean: 0.0,
					standard_deviation: 0.0,
					standard_error: 0.0,
				},
			}
		})
		.collect()
}

fn r_squared(predictions: &Array1<f32>, labels: &[f32]) -> f64 {
	let predictions = predictions.to_vec();
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions: &predictions,
		labels,
	});
	metrics.finalize().r2
}

/// Order feature indexes by descending absolute mean importance. Features with equal importance keep their original order.
pub fn rank(importances: &[FeatureImportance]) -> Vec<usize> {
	let mut order: Vec<usize> = (0..importances.len()).collect();
	order.sort_by(|a, b| {
		importances[*b]
			.mean
			.abs()
			.total_cmp(&importances[*a].mean.abs())
	});
	order
}

/// The name of the feature at `index`, `<column>-<type>`, taken from the column list of the transformed table.
pub fn feature_name(table: &FeatureTable, index: usize) -> String {
	table
		.columns
		.get(index)
		.map(|column| format!("{}-{}", column.name(), column.type_name()))
		.unwrap_or_else(|| OUT_OF_RANGE_NAME.to_owned())
}

/// Rank the features of `model` by permutation importance. A fresh regressor is trained with `trainer` on the transformed training table, so the ranking reflects the features rather than the model saved by the run.
pub fn report(
	context: &Context,
	trainer: &impl RegressionTrainer,
	model: &FittedModel,
	train: &DataFrame,
	permutation_count: usize,
) -> Result<Vec<RankedFeatureImportance>, Error> {
	let view = train.view();
	let table = model.transform(&view)?;
	let features = features(&table)?;
	let labels = labels(&view)?;
	let predictor = trainer.fit(context, features, labels);
	let importances =
		permutation_feature_importance(context, &predictor, features, labels, permutation_count);
	tracing::debug!(
		slots = importances.len(),
		columns = table.ncols(),
		"computed permutation feature importance"
	);
	let ranked = rank(&importances)
		.into_iter()
		.map(|feature_index| RankedFeatureImportance {
			feature_index,
			feature_name: feature_name(&table, feature_index),
			importance: importances[feature_index].clone(),
		})
		.collect();
	Ok(ranked)
}

#[cfg(test)]
mod test {
	use super::*;

	fn importance(mean: f64) -> FeatureImportance {
		FeatureImportance {
			mean,
			standard_deviation: 0.0,
			standard_error: 0.0,
		}
	}

	#[test]
	fn test_rank_is_stable_on_ties() {
		let importances = vec![
			importance(0.1),
			importance(-0.5),
			importance(0.1),
			importance(-0.1),
			importance(0.0),
		];
		assert_eq!(rank(&importances), vec![1, 0, 2, 3, 4]);
	}

	/// Predicts the first feature and ignores the rest.
	struct FirstFeature;

	impl RegressionPredictor for FirstFeature {
		fn predict(&self, features: ArrayView2<f32>) -> Array1<f32> {
			features.column(0).to_owned()
		}
	}

	#[test]
	fn test_permutation_feature_importance() {
		let features = Array::from_shape_fn((50, 2), |(i, j)| if j == 0 { i as f32 } else { 1.0 });
		let labels = Array::from_shape_fn(50, |i| i as f32);
		let context = Context::default();
		let importances = permutation_feature_importance(
			&context,
			&FirstFeature,
			features.view(),
			labels.view(),
			10,
		);
		assert!(importances[0].mean < -0.5);
		assert!(importances[0].standard_error > 0.0);
		assert_eq!(importances[1], importance(0.0));
		assert_eq!(rank(&importances), vec![0, 1]);
		let again = permutation_feature_importance(
			&context,
			&FirstFeature,
			features.view(),
			labels.view(),
			10,
		);
		assert_eq!(importances, again);
	}

	#[test]
	fn test_feature_name_falls_back_to_out_of_range() {
		use rrt_dataframe::{Column, NumberColumn};
		use rrt_features::FeatureColumn;
		let table = FeatureTable {
			columns: vec![FeatureColumn::Scalar(Column::Number(NumberColumn {
				name: "price".to_owned(),
				data: vec![1.0],
			}))],
		};
		assert_eq!(feature_name(&table, 0), "price-Number");
		assert_eq!(feature_name(&table, 1), "OutOfRange");
	}
}
