use crate::{
	features::build_feature_pipeline,
	model::{features, labels, FittedModel},
	regressor::{GbtRegressionTrainer, RegressionTrainer},
	schema, Context, Error,
};
use rrt_dataframe::DataFrame;
use rrt_tree::TrainOptions;

/// Fit the feature pipeline and a gradient boosted tree regressor to the training table. The same context, options and data always produce the same model.
pub fn fit(context: &Context, options: &TrainOptions, train: &DataFrame) -> Result<FittedModel, Error> {
	if train.nrows() == 0 {
		return Err(Error::EmptyTable);
	}
	let view = train.view();
	let feature_pipeline = build_feature_pipeline(&train.column_names()).fit(&view)?;
	let table = feature_pipeline.transform(&view)?;
	let features = features(&table)?;
	let labels = labels(&view)?;
	tracing::info!(
		rows = features.nrows(),
		features = features.ncols(),
		rounds = options.max_rounds,
		"training regressor"
	);
	let trainer = GbtRegressionTrainer {
		options: options.clone(),
	};
	let regressor = trainer.fit(context, features, labels);
	if let Some(loss) = regressor.losses.as_ref().and_then(|losses| losses.last()) {
		tracing::debug!(loss, "final training loss");
	}
	Ok(FittedModel {
		schema: schema::schema(),
		feature_pipeline,
		regressor,
	})
}
