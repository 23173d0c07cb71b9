use crate::{
	model::{labels, FittedModel},
	Error,
};
use rrt_dataframe::DataFrame;
use rrt_metrics::{RegressionMetrics, RegressionMetricsInput, RegressionMetricsOutput, StreamingMetric};

/// Metrics computed on the test table, at full precision.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EvaluationMetrics {
	pub r_squared: f64,
	pub root_mean_squared_error: f64,
	pub mean_squared_error: f64,
	pub mean_absolute_error: f64,
	/// The mean squared error loss.
	pub loss_function_value: f64,
	pub baseline_mean_squared_error: f64,
	pub baseline_root_mean_squared_error: f64,
}

impl From<RegressionMetricsOutput> for EvaluationMetrics {
	fn from(output: RegressionMetricsOutput) -> Self {
		EvaluationMetrics {
			r_squared: output.r2,
			root_mean_squared_error: output.rmse,
			mean_squared_error: output.mse,
			mean_absolute_error: output.mae,
			loss_function_value: output.loss,
			baseline_mean_squared_error: output.baseline_mse,
			baseline_root_mean_squared_error: output.baseline_rmse,
		}
	}
}

/// Predict every row of `test` and compare the predictions with its labels.
pub fn evaluate(model: &FittedModel, test: &DataFrame) -> Result<EvaluationMetrics, Error> {
	let view = test.view();
	let predictions = model.predict(&view)?.to_vec();
	let labels = labels(&view)?.to_vec();
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions: &predictions,
		labels: &labels,
	});
	Ok(metrics.finalize().into())
}

#[test]
fn test_evaluate_matches_the_predictions() {
	use crate::{config::default_tree_options, predict::canonical_record, schema, train::fit, Context};
	let records = (0..60)
		.map(|index| {
			let mut record = canonical_record();
			record.run = index;
			record.security = ["Apex", "Zenith", "Harbor"][index as usize % 3].to_owned();
			record.price = 50.0 + index as f32;
			record.avg_rate_of_return = 0.01 * (index % 7) as f32;
			record
		})
		.collect::<Vec<_>>();
	let dataframe = schema::records_to_dataframe(&records);
	let options = rrt_tree::TrainOptions {
		max_rounds: 10,
		min_examples_per_child: 5,
		..default_tree_options()
	};
	let model = fit(&Context::default(), &options, &dataframe).unwrap();
	let metrics = evaluate(&model, &dataframe).unwrap();
	let predictions = model.predict(&dataframe.view()).unwrap();
	let mean_squared_error = records
		.iter()
		.zip(predictions.iter())
		.map(|(record, prediction)| f64::from(record.avg_rate_of_return - prediction).powi(2))
		.sum::<f64>()
		/ records.len() as f64;
	assert!((metrics.mean_squared_error - mean_squared_error).abs() < 1e-6);
	assert!(metrics.r_squared.is_finite());
	assert!(metrics.mean_squared_error <= metrics.baseline_mean_squared_error);
}
