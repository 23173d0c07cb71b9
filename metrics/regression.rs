use super::{mean_variance::MeanVariance, MeanVarianceOutput, StreamingMetric};
use num_traits::ToPrimitive;

/// `RegressionMetrics` computes metrics used to evaluate regressors. All sums are accumulated in `f64`.
#[derive(Clone, Debug, Default)]
pub struct RegressionMetrics {
	labels: MeanVariance,
	absolute_error: f64,
	squared_error: f64,
}

/// The input to [`RegressionMetrics`](struct.RegressionMetrics.html).
pub struct RegressionMetricsInput<'a> {
	pub predictions: &'a [f32],
	pub labels: &'a [f32],
}

/// The output from [`RegressionMetrics`](struct.RegressionMetrics.html).
#[derive(Clone, Debug, PartialEq)]
pub struct RegressionMetricsOutput {
	/// The mean squared error is equal to the mean of the squared errors. For a given example, the error is the difference between the true value and the model's predicted value.
	pub mse: f64,
	/// The root mean squared error is equal to the square root of the mean squared error.
	pub rmse: f64,
	/// The mean of the absolute value of the errors.
	pub mae: f64,
	/// The r-squared value. https://en.wikipedia.org/wiki/Coefficient_of_determination.
	pub r2: f64,
	/// The mean value of the squared error loss the trees are trained to minimize.
	pub loss: f64,
	/// The baseline mean squared error is the mean squared error if the model always predicted the mean of the labels.
	pub baseline_mse: f64,
	/// The baseline root mean squared error is the square root of the baseline mean squared error.
	pub baseline_rmse: f64,
}

impl RegressionMetrics {
	pub fn new() -> Self {
		Self::default()
	}
}

impl<'a> StreamingMetric<'a> for RegressionMetrics {
	type Input = RegressionMetricsInput<'a>;
	type Output = RegressionMetricsOutput;

	fn update(&mut self, input: RegressionMetricsInput) {
		for (prediction, label) in input.predictions.iter().zip(input.labels.iter()) {
			let prediction = prediction.to_f64().unwrap();
			let label = label.to_f64().unwrap();
			self.labels.update(label);
			let error = prediction - label;
			self.absolute_error += error.abs();
			self.squared_error += error * error;
		}
	}

	fn merge(&mut self, other: Self) {
		self.labels.merge(other.labels);
		self.absolute_error += other.absolute_error;
		self.squared_error += other.squared_error;
	}

	fn finalize(self) -> Self::Output {
		let (n, variance) = match self.labels.finalize() {
			Some(MeanVarianceOutput { n, variance, .. }) => (n.to_f64().unwrap(), variance),
			None => (0.0, f64::NAN),
		};
		let mae = self.absolute_error / n;
		let mse = self.squared_error / n;
		let rmse = mse.sqrt();
		let r2 = 1.0 - self.squared_error / (variance * n);
		RegressionMetricsOutput {
			mse,
			rmse,
			mae,
			r2,
			loss: mse,
			baseline_mse: variance,
			baseline_rmse: variance.sqrt(),
		}
	}
}

#[test]
fn test_regression_metrics() {
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions: &[1.0, 2.0],
		labels: &[1.0, 2.0],
	});
	metrics.update(RegressionMetricsInput {
		predictions: &[3.0],
		labels: &[4.0],
	});
	let metrics = metrics.finalize();
	assert!((metrics.mse - 1.0 / 3.0).abs() < 1e-12);
	assert!((metrics.rmse - (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
	assert!((metrics.mae - 1.0 / 3.0).abs() < 1e-12);
	assert!((metrics.r2 - 11.0 / 14.0).abs() < 1e-12);
	assert!((metrics.baseline_mse - 14.0 / 9.0).abs() < 1e-12);
	assert_eq!(metrics.loss, metrics.mse);
}

#[test]
fn test_absolute_error_does_not_cancel() {
	let mut metrics = RegressionMetrics::new();
	metrics.update(RegressionMetricsInput {
		predictions: &[2.0, 0.0],
		labels: &[1.0, 1.0],
	});
	let metrics = metrics.finalize();
	insta::assert_debug_snapshot!(metrics, @r###"
 RegressionMetricsOutput {
     mse: 1.0,
     rmse: 1.0,
     mae: 1.0,
     r2: -inf,
     loss: 1.0,
     baseline_mse: 0.0,
     baseline_rmse: 0.0,
 }
 "###);
}
