//! https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Parallel_algorithm

use super::StreamingMetric;
use num_traits::ToPrimitive;

/// Combine two separate means and m2s into a single mean and m2.
pub fn merge_mean_m2(
	n_a: u64,
	mean_a: f64,
	m2_a: f64,
	n_b: u64,
	mean_b: f64,
	m2_b: f64,
) -> (f64, f64) {
	let n_a = n_a.to_f64().unwrap();
	let n_b = n_b.to_f64().unwrap();
	(
		(((n_a * mean_a) + (n_b * mean_b)) / (n_a + n_b)),
		m2_a + m2_b + (mean_b - mean_a) * (mean_b - mean_a) * (n_a * n_b / (n_a + n_b)),
	)
}

/// Convert an m2 accumulated over `n` values to the population variance.
pub fn m2_to_variance(m2: f64, n: u64) -> f64 {
	m2 / n.to_f64().unwrap()
}

/// `MeanVariance` computes the count, mean and population variance of a stream of values.
#[derive(Clone, Debug, Default)]
pub struct MeanVariance(Option<MeanVarianceState>);

#[derive(Clone, Debug)]
struct MeanVarianceState {
	n: u64,
	mean: f64,
	m2: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeanVarianceOutput {
	pub n: u64,
	pub mean: f64,
	pub variance: f64,
}

impl MeanVarianceOutput {
	/// The sample standard deviation, using Bessel's correction. It is zero when fewer than two values were seen.
	pub fn sample_standard_deviation(&self) -> f64 {
		if self.n < 2 {
			return 0.0;
		}
		let n = self.n.to_f64().unwrap();
		(self.variance * n / (n - 1.0)).sqrt()
	}

	/// The standard error of the mean.
	pub fn standard_error(&self) -> f64 {
		if self.n == 0 {
			return 0.0;
		}
		self.sample_standard_deviation() / self.n.to_f64().unwrap().sqrt()
	}
}

impl StreamingMetric<'_> for MeanVariance {
	type Input = f64;
	type Output = Option<MeanVarianceOutput>;

	fn update(&mut self, value: f64) {
		self.merge(MeanVariance(Some(MeanVarianceState {
			n: 1,
			mean: value,
			m2: 0.0,
		})))
	}

	fn merge(&mut self, other: Self) {
		match (&mut self.0, other.0) {
			(Some(state), Some(other)) => {
				let (mean, m2) =
					merge_mean_m2(state.n, state.mean, state.m2, other.n, other.mean, other.m2);
				state.n += other.n;
				state.mean = mean;
				state.m2 = m2;
			}
			(None, other) => self.0 = other,
			(Some(_), None) => {}
		}
	}

	fn finalize(self) -> Self::Output {
		self.0.map(|state| MeanVarianceOutput {
			n: state.n,
			mean: state.mean,
			variance: m2_to_variance(state.m2, state.n),
		})
	}
}

#[test]
fn test_mean_variance() {
	let mut metric = MeanVariance::default();
	for value in &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
		metric.update(*value);
	}
	let output = metric.finalize().unwrap();
	assert_eq!(output.n, 8);
	assert!((output.mean - 5.0).abs() < 1e-12);
	assert!((output.variance - 4.0).abs() < 1e-12);
	assert!((output.sample_standard_deviation() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_mean_variance_merge() {
	let mut a = MeanVariance::default();
	let mut b = MeanVariance::default();
	a.update(1.0);
	a.update(2.0);
	b.update(3.0);
	b.update(4.0);
	a.merge(b);
	let output = a.finalize().unwrap();
	assert!((output.mean - 2.5).abs() < 1e-12);
	assert!((output.variance - 1.25).abs() < 1e-12);
	assert!(MeanVariance::default().finalize().is_none());
}
