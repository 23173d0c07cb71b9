/*!
This crate turns the columns of a [`DataFrame`](rrt_dataframe::DataFrame) into numeric features. A [`FeaturePipeline`] is an ordered list of stages. Fitting it learns whatever the stages need from the training data, for example the categories of a one-hot encoded column, and the resulting [`FittedFeaturePipeline`] applies exactly the same transformation to any other table with the same columns.
*/

#![allow(clippy::tabs_in_doc_comments)]

use fnv::FnvHashMap;
use ndarray::prelude::*;
use rrt_dataframe::ColumnView;

mod pipeline;
mod table;

pub use self::pipeline::*;
pub use self::table::*;

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
	#[error("column \"{0}\" was not found")]
	ColumnNotFound(String),
	#[error("column \"{name}\" has type {column_type}, which cannot be {operation}")]
	UnsupportedColumnType {
		name: String,
		column_type: &'static str,
		operation: &'static str,
	},
}

/**
A `OneHotEncodedFeatureGroup` creates one number feature for each category seen in a column during fitting. For each example, all of the features will have the value 0.0, except the feature corresponding to the column's value, which will have the value 1.0. Values that were not seen during fitting, and invalid enum values, produce all zeros.

# Example

Fitting on the values `["Pioneer", "Apex", "Pioneer"]` learns the categories in the order they first occur:

| category  | feature index |
|-----------|---------------|
| "Pioneer" | 0             |
| "Apex"    | 1             |

| dataframe value | feature values |
|-----------------|----------------|
| "Apex"          | [0, 1]         |
| "Pioneer"       | [1, 0]         |
| "Zenith"        | [0, 0]         |
*/
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OneHotEncodedFeatureGroup {
	pub source_column_name: String,
	/// The categories, in the order they first occurred in the training data.
	pub options: Vec<String>,
	pub options_map: FnvHashMap<String, usize>,
}

impl OneHotEncodedFeatureGroup {
	/// Learn the categories of an enum or text column.
	pub fn fit(column: &ColumnView) -> Result<Self, FeatureError> {
		check_categorical(column)?;
		let mut options = Vec::new();
		let mut options_map = FnvHashMap::default();
		for index in 0..column.len() {
			if let Some(label) = column.label_at(index) {
				if !options_map.contains_key(label) {
					options_map.insert(label.to_owned(), options.len());
					options.push(label.to_owned());
				}
			}
		}
		Ok(Self {
			source_column_name: column.name().to_owned(),
			options,
			options_map,
		})
	}

	pub fn n_features(&self) -> usize {
		self.options.len()
	}

	/// The name of each feature, `<column>.<category>`.
	pub fn feature_names(&self) -> Vec<String> {
		self.options
			.iter()
			.map(|option| format!("{}.{}", self.source_column_name, option))
			.collect()
	}

	pub fn compute_array_f32(
		&self,
		mut features: ArrayViewMut2<f32>,
		column: &ColumnView,
	) -> Result<(), FeatureError> {
		check_categorical(column)?;
		// Fill the features with zeros.
		features.fill(0.0);
		// For each example, set the feature corresponding to the category to one.
		for (example_index, mut features) in features.axis_iter_mut(Axis(0)).enumerate() {
			let feature_index = column
				.label_at(example_index)
				.and_then(|label| self.options_map.get(label));
			if let Some(feature_index) = feature_index {
				features[*feature_index] = 1.0;
			}
		}
		Ok(())
	}

	/// Encode `column` into a vector column that takes the source column's name.
	pub fn compute(&self, column: &ColumnView) -> Result<VectorColumn, FeatureError> {
		let mut values = Array::zeros((column.len(), self.n_features()));
		self.compute_array_f32(values.view_mut(), column)?;
		Ok(VectorColumn {
			name: self.source_column_name.clone(),
			feature_names: self.feature_names(),
			values,
		})
	}
}

fn check_categorical(column: &ColumnView) -> Result<(), FeatureError> {
	match column {
		ColumnView::Enum(_) | ColumnView::Text(_) => Ok(()),
		_ => Err(FeatureError::UnsupportedColumnType {
			name: column.name().to_owned(),
			column_type: column.type_name(),
			operation: "one-hot encoded",
		}),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rrt_dataframe::{Column, TextColumn};

	fn securities(values: &[&str]) -> Column {
		Column::Text(TextColumn {
			name: "security".to_owned(),
			data: values.iter().map(|value| value.to_string()).collect(),
		})
	}

	#[test]
	fn test_one_hot_learns_categories_in_first_occurrence_order() {
		let column = securities(&["Pioneer", "Apex", "Pioneer"]);
		let group = OneHotEncodedFeatureGroup::fit(&column.view()).unwrap();
		assert_eq!(group.options, vec!["Pioneer", "Apex"]);
		assert_eq!(group.feature_names(), vec!["security.Pioneer", "security.Apex"]);
	}

	#[test]
	fn test_one_hot_encodes_unseen_values_as_zeros() {
		let group =
			OneHotEncodedFeatureGroup::fit(&securities(&["Pioneer", "Apex"]).view()).unwrap();
		let vector = group
			.compute(&securities(&["Apex", "Zenith", "Pioneer"]).view())
			.unwrap();
		assert_eq!(vector.values, arr2(&[[0.0, 1.0], [0.0, 0.0], [1.0, 0.0]]));
	}

	#[test]
	fn test_one_hot_rejects_number_columns() {
		let column = Column::Number(rrt_dataframe::NumberColumn {
			name: "price".to_owned(),
			data: vec![1.0],
		});
		let error = OneHotEncodedFeatureGroup::fit(&column.view()).unwrap_err();
		assert_eq!(
			error.to_string(),
			"column \"price\" has type Number, which cannot be one-hot encoded"
		);
	}
}
