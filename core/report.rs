/*!
This module formats the results of a run for the console.
*/

use crate::{importance::RankedFeatureImportance, schema::PredictionResult, test::EvaluationMetrics};
use std::fmt::Write;

pub fn format_metrics(metrics: &EvaluationMetrics) -> String {
	let mut output = String::new();
	writeln!(output, "Metrics for the regression model").ok();
	writeln!(output, "  RSquared: {:.2}", metrics.r_squared).ok();
	writeln!(output, "  RMSE:     {:.2}", metrics.root_mean_squared_error).ok();
	writeln!(output, "  MSE:      {:.2}", metrics.mean_squared_error).ok();
	writeln!(output, "  MAE:      {:.2}", metrics.mean_absolute_error).ok();
	writeln!(output, "  Loss:     {:.2}", metrics.loss_function_value).ok();
	output
}

pub fn format_prediction(prediction: &PredictionResult, actual: f64) -> String {
	let mut output = String::new();
	writeln!(
		output,
		"Predicted rate of return: {:.2}%",
		prediction.avg_rate_of_return as f64 * 100.0
	)
	.ok();
	writeln!(output, "Actual rate of return:    {:.2}%", actual * 100.0).ok();
	output
}

/// One line per feature, most important first: the mean change in R², a tab, and the feature's name.
pub fn format_importances(importances: &[RankedFeatureImportance]) -> String {
	let mut output = String::new();
	writeln!(output, "Feature importance (mean change in R-squared)").ok();
	for importance in importances {
		writeln!(
			output,
			"{:.6}\t{}",
			importance.importance.mean, importance.feature_name
		)
		.ok();
	}
	output
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::importance::FeatureImportance;

	#[test]
	fn test_format_metrics() {
		let metrics = EvaluationMetrics {
			r_squared: 0.91234,
			root_mean_squared_error: 0.0123,
			mean_squared_error: 0.000151,
			mean_absolute_error: 0.0098,
			loss_function_value: 0.000151,
			baseline_mean_squared_error: 0.0017,
			baseline_root_mean_squared_error: 0.041,
		};
		insta::assert_snapshot!(format_metrics(&metrics), @r###"
  Metrics for the regression model
    RSquared: 0.91
    RMSE:     0.01
    MSE:      0.00
    MAE:      0.01
    Loss:     0.00
  "###);
	}

	#[test]
	fn test_format_prediction() {
		let prediction = PredictionResult {
			avg_rate_of_return: 0.1012,
		};
		insta::assert_snapshot!(format_prediction(&prediction, 0.109963825208794), @r###"
  Predicted rate of return: 10.12%
  Actual rate of return:    11.00%
  "###);
	}

	#[test]
	fn test_format_importances() {
		let importances = vec![
			RankedFeatureImportance {
				feature_index: 1,
				feature_name: "year-Number".to_owned(),
				importance: FeatureImportance {
					mean: -0.4213,
					standard_deviation: 0.01,
					standard_error: 0.003,
				},
			},
			RankedFeatureImportance {
				feature_index: 12,
				feature_name: "OutOfRange".to_owned(),
				importance: FeatureImportance {
					mean: 0.0000012,
					standard_deviation: 0.0,
					standard_error: 0.0,
				},
			},
		];
		insta::assert_snapshot!(format_importances(&importances), @r###"
  Feature importance (mean change in R-squared)
  -0.421300	year-Number
  0.000001	OutOfRange
  "###);
	}
}
