use crate::{
	model::FittedModel,
	schema::{records_to_dataframe, PredictionResult, SimulationRecord},
	Error,
};

/// The known rate of return of [`canonical_record`].
pub const CANONICAL_ACTUAL: f64 = 0.109963825208794;

/// The record the workflow makes its single prediction for.
pub fn canonical_record() -> SimulationRecord {
	SimulationRecord {
		run: 137,
		security: "Pioneer".to_owned(),
		year: 10.0,
		price: 92.0,
		delta: 15.0,
		is_split: false,
		is_bust: false,
		r#yield: 4.0,
		avg_rate_of_return: CANONICAL_ACTUAL as f32,
	}
}

/// Predict the rate of return of a single record.
pub fn predict_one(model: &FittedModel, record: &SimulationRecord) -> Result<PredictionResult, Error> {
	let dataframe = records_to_dataframe(std::slice::from_ref(record));
	let predictions = model.predict(&dataframe.view())?;
	Ok(PredictionResult {
		avg_rate_of_return: predictions[0],
	})
}
