use crate::schema::{LABEL_COLUMN_NAME, RUN_COLUMN_NAME};
use rrt_features::{FeaturePipeline, Stage};

/// The name of the vector column the estimator trains on.
pub const FEATURES_COLUMN_NAME: &str = "Features";
/// The columns that are one-hot encoded.
pub const CATEGORICAL_COLUMN_NAMES: [&str; 3] = ["security", "isSplit", "isBust"];

/// Build the feature pipeline for a table with the given columns. Encoded columns keep their position, so the features are concatenated in the order `column_names` lists them, leaving out the run and label columns.
pub fn build_feature_pipeline(column_names: &[&str]) -> FeaturePipeline {
	let input_column_names: Vec<&str> = column_names
		.iter()
		.cloned()
		.filter(|name| *name != LABEL_COLUMN_NAME && *name != RUN_COLUMN_NAME)
		.collect();
	FeaturePipeline {
		stages: vec![
			Stage::OneHotEncode {
				column_names: strings(&CATEGORICAL_COLUMN_NAMES),
			},
			Stage::DropColumns {
				column_names: strings(&[RUN_COLUMN_NAME]),
			},
			Stage::Concatenate {
				output_column_name: FEATURES_COLUMN_NAME.to_owned(),
				input_column_names: strings(&input_column_names),
			},
			Stage::Cache,
		],
	}
}

fn strings(names: &[&str]) -> Vec<String> {
	names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_build_feature_pipeline() {
	let column_names: Vec<&str> = crate::schema::FIELDS.iter().map(|(name, _)| *name).collect();
	let pipeline = build_feature_pipeline(&column_names);
	insta::assert_debug_snapshot!(pipeline.stages[2], @r###"
 Concatenate {
     output_column_name: "Features",
     input_column_names: [
         "security",
         "year",
         "price",
         "delta",
         "isSplit",
         "isBust",
         "yield",
     ],
 }
 "###);
}
