use crate::{FeatureColumn, FeatureError, FeatureTable, OneHotEncodedFeatureGroup, VectorColumn};
use ndarray::prelude::*;
use rrt_dataframe::{Column, DataFrameView};

/// A `FeaturePipeline` describes a sequence of stages to apply to a table. Call `fit` to learn the state the stages need from the training data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeaturePipeline {
	pub stages: Vec<Stage>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Stage {
	/// Replace each named column, in place, with its one-hot encoding.
	OneHotEncode { column_names: Vec<String> },
	/// Remove the named columns. Columns that are not present are ignored.
	DropColumns { column_names: Vec<String> },
	/// Append a vector column holding the features of the input columns in order. Inputs must be number columns or vector columns.
	Concatenate {
		output_column_name: String,
		input_column_names: Vec<String>,
	},
	/// Materialize the table. Every stage already produces an owned table, so this does nothing.
	Cache,
}

/// The result of fitting a `FeaturePipeline`. Its state is fixed, so transforming any table applies exactly what was learned from the training data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FittedFeaturePipeline {
	pub stages: Vec<FittedStage>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FittedStage {
	OneHotEncode(Vec<OneHotEncodedFeatureGroup>),
	DropColumns {
		column_names: Vec<String>,
	},
	Concatenate {
		output_column_name: String,
		input_column_names: Vec<String>,
	},
	Cache,
}

impl FeaturePipeline {
	/// Fit each stage on the output of the stages before it.
	pub fn fit(&self, dataframe: &DataFrameView) -> Result<FittedFeaturePipeline, FeatureError> {
		let mut table = FeatureTable::from_dataframe(dataframe);
		let mut stages = Vec::with_capacity(self.stages.len());
		for stage in self.stages.iter() {
			let fitted_stage = stage.fit(&table)?;
			table = fitted_stage.apply(table)?;
			stages.push(fitted_stage);
		}
		Ok(FittedFeaturePipeline { stages })
	}
}

impl Stage {
	fn fit(&self, table: &FeatureTable) -> Result<FittedStage, FeatureError> {
		let fitted_stage = match self {
			Stage::OneHotEncode { column_names } => {
				let feature_groups = column_names
					.iter()
					.map(|column_name| {
						let column = scalar_column(table, column_name, "one-hot encoded")?;
						OneHotEncodedFeatureGroup::fit(&column.view())
					})
					.collect::<Result<Vec<_>, _>>()?;
				FittedStage::OneHotEncode(feature_groups)
			}
			Stage::DropColumns { column_names } => FittedStage::DropColumns {
				column_names: column_names.clone(),
			},
			Stage::Concatenate {
				output_column_name,
				input_column_names,
			} => FittedStage::Concatenate {
				output_column_name: output_column_name.clone(),
				input_column_names: input_column_names.clone(),
			},
			Stage::Cache => FittedStage::Cache,
		};
		Ok(fitted_stage)
	}
}

impl FittedFeaturePipeline {
	/// Apply every stage to `dataframe`.
	pub fn transform(&self, dataframe: &DataFrameView) -> Result<FeatureTable, FeatureError> {
		let mut table = FeatureTable::from_dataframe(dataframe);
		for stage in self.stages.iter() {
			table = stage.apply(table)?;
		}
		Ok(table)
	}
}

impl FittedStage {
	pub fn apply(&self, mut table: FeatureTable) -> Result<FeatureTable, FeatureError> {
		match self {
			FittedStage::OneHotEncode(feature_groups) => {
				for feature_group in feature_groups.iter() {
					let name = feature_group.source_column_name.as_str();
					let column_index = table
						.column_index(name)
						.ok_or_else(|| FeatureError::ColumnNotFound(name.to_owned()))?;
					let column = scalar_column(&table, name, "one-hot encoded")?;
					let vector = feature_group.compute(&column.view())?;
					table.columns[column_index] = FeatureColumn::Vector(vector);
				}
			}
			FittedStage::DropColumns { column_names } => {
				table
					.columns
					.retain(|column| !column_names.iter().any(|name| name == column.name()));
			}
			FittedStage::Concatenate {
				output_column_name,
				input_column_names,
			} => {
				let vector = concatenate(&table, output_column_name, input_column_names)?;
				match table.column_index(output_column_name) {
					Some(column_index) => table.columns[column_index] = FeatureColumn::Vector(vector),
					None => table.columns.push(FeatureColumn::Vector(vector)),
				}
			}
			FittedStage::Cache => {}
		}
		Ok(table)
	}
}

fn scalar_column<'a>(
	table: &'a FeatureTable,
	name: &str,
	operation: &'static str,
) -> Result<&'a Column, FeatureError> {
	match table.column(name) {
		Some(FeatureColumn::Scalar(column)) => Ok(column),
		Some(column) => Err(FeatureError::UnsupportedColumnType {
			name: name.to_owned(),
			column_type: column.type_name(),
			operation,
		}),
		None => Err(FeatureError::ColumnNotFound(name.to_owned())),
	}
}

fn concatenate(
	table: &FeatureTable,
	output_column_name: &str,
	input_column_names: &[String],
) -> Result<VectorColumn, FeatureError> {
	let columns = input_column_names
		.iter()
		.map(|name| {
			let column = table
				.column(name)
				.ok_or_else(|| FeatureError::ColumnNotFound(name.to_owned()))?;
			match column {
				FeatureColumn::Scalar(Column::Number(_)) | FeatureColumn::Vector(_) => Ok(column),
				_ => Err(FeatureError::UnsupportedColumnType {
					name: name.to_owned(),
					column_type: column.type_name(),
					operation: "concatenated",
				}),
			}
		})
		.collect::<Result<Vec<_>, _>>()?;
	let n_features = columns.iter().map(|column| column.n_features()).sum();
	let mut values = Array::zeros((table.nrows(), n_features));
	let mut feature_names = Vec::with_capacity(n_features);
	let mut offset = 0;
	for column in columns {
		let n = column.n_features();
		let mut slice = values.slice_mut(s![.., offset..offset + n]);
		match column {
			FeatureColumn::Scalar(Column::Number(column)) => {
				for (feature, value) in slice.column_mut(0).iter_mut().zip(column.data.iter()) {
					*feature = *value;
				}
				feature_names.push(column.name.clone());
			}
			FeatureColumn::Vector(column) => {
				slice.assign(&column.values);
				feature_names.extend(column.feature_names.iter().cloned());
			}
			FeatureColumn::Scalar(_) => {}
		}
		offset += n;
	}
	Ok(VectorColumn {
		name: output_column_name.to_owned(),
		feature_names,
		values,
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use rrt_dataframe::{DataFrame, NumberColumn, TextColumn};

	fn dataframe(securities: &[&str]) -> DataFrame {
		let n = securities.len();
		DataFrame {
			columns: vec![
				Column::Number(NumberColumn {
					name: "run".to_owned(),
					data: (0..n).map(|i| i as f32).collect(),
				}),
				Column::Text(TextColumn {
					name: "security".to_owned(),
					data: securities.iter().map(|s| s.to_string()).collect(),
				}),
				Column::Number(NumberColumn {
					name: "price".to_owned(),
					data: (0..n).map(|i| 10.0 * i as f32).collect(),
				}),
				Column::Number(NumberColumn {
					name: "Label".to_owned(),
					data: vec![0.5; n],
				}),
			],
		}
	}

	fn pipeline() -> FeaturePipeline {
		FeaturePipeline {
			stages: vec![
				Stage::OneHotEncode {
					column_names: vec!["security".to_owned()],
				},
				Stage::DropColumns {
					column_names: vec!["run".to_owned()],
				},
				Stage::Concatenate {
					output_column_name: "Features".to_owned(),
					input_column_names: vec!["security".to_owned(), "price".to_owned()],
				},
				Stage::Cache,
			],
		}
	}

	#[test]
	fn test_pipeline() {
		let train = dataframe(&["Pioneer", "Apex", "Pioneer"]);
		let fitted = pipeline().fit(&train.view()).unwrap();
		let table = fitted.transform(&dataframe(&["Apex", "Zenith"]).view()).unwrap();
		insta::assert_debug_snapshot!(table.column_names(), @r###"
  [
      "security",
      "price",
      "Label",
      "Features",
  ]
  "###);
		let features = table.vector("Features").unwrap();
		assert_eq!(
			features.feature_names,
			vec!["security.Pioneer", "security.Apex", "price"]
		);
		assert_eq!(features.values, arr2(&[[0.0, 1.0, 0.0], [0.0, 0.0, 10.0]]));
		assert_eq!(table.number("Label"), Some([0.5, 0.5].as_slice()));
	}

	#[test]
	fn test_concatenate_rejects_text_columns() {
		let pipeline = FeaturePipeline {
			stages: vec![Stage::Concatenate {
				output_column_name: "Features".to_owned(),
				input_column_names: vec!["security".to_owned()],
			}],
		};
		let error = pipeline.fit(&dataframe(&["Apex"]).view()).unwrap_err();
		assert_eq!(
			error.to_string(),
			"column \"security\" has type Text, which cannot be concatenated"
		);
	}

	#[test]
	fn test_missing_columns_are_reported() {
		let fitted = pipeline().fit(&dataframe(&["Apex"]).view()).unwrap();
		let mut other = dataframe(&["Apex"]);
		other.columns.remove(2);
		let error = fitted.transform(&other.view()).unwrap_err();
		assert_eq!(error.to_string(), "column \"price\" was not found");
	}
}
