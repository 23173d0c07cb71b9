use ndarray::prelude::*;
use rrt_dataframe::{Column, DataFrameView};

/// A `FeatureTable` is the output of a feature pipeline. It holds the columns of the source table that pass through untouched alongside the vector columns the pipeline creates.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTable {
	pub columns: Vec<FeatureColumn>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FeatureColumn {
	Scalar(Column),
	Vector(VectorColumn),
}

/// A column holding a fixed-length vector of features for each example, stored as a matrix with one row per example.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorColumn {
	pub name: String,
	pub feature_names: Vec<String>,
	pub values: Array2<f32>,
}

impl FeatureTable {
	pub fn from_dataframe(dataframe: &DataFrameView) -> FeatureTable {
		let columns = dataframe
			.columns
			.iter()
			.map(|column| FeatureColumn::Scalar(column.to_column()))
			.collect();
		FeatureTable { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|column| column.name() == name)
	}

	pub fn column(&self, name: &str) -> Option<&FeatureColumn> {
		self.columns.iter().find(|column| column.name() == name)
	}

	pub fn vector(&self, name: &str) -> Option<&VectorColumn> {
		self.column(name).and_then(|column| column.as_vector())
	}

	pub fn number(&self, name: &str) -> Option<&[f32]> {
		match self.column(name)? {
			FeatureColumn::Scalar(Column::Number(column)) => Some(column.data.as_slice()),
			_ => None,
		}
	}
}

impl FeatureColumn {
	pub fn name(&self) -> &str {
		match self {
			Self::Scalar(column) => column.name(),
			Self::Vector(column) => column.name.as_str(),
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Self::Scalar(column) => column.len(),
			Self::Vector(column) => column.values.nrows(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The name of this column's type, as it appears in reports.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Scalar(column) => column.type_name(),
			Self::Vector(_) => "Vector",
		}
	}

	/// The number of features this column contributes when concatenated.
	pub fn n_features(&self) -> usize {
		match self {
			Self::Scalar(_) => 1,
			Self::Vector(column) => column.values.ncols(),
		}
	}

	pub fn as_vector(&self) -> Option<&VectorColumn> {
		match self {
			Self::Vector(column) => Some(column),
			_ => None,
		}
	}
}
