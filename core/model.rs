/*!
This module defines the `FittedModel`, which holds the schema, the fitted feature pipeline and the trained regressor, and its on-disk format: a one-byte major version followed by the model encoded as MessagePack.
*/

use crate::{
	features::FEATURES_COLUMN_NAME,
	regressor::RegressionPredictor,
	schema::{Field, LABEL_COLUMN_NAME},
	Error,
};
use ndarray::prelude::*;
use rrt_dataframe::DataFrameView;
use rrt_features::{FeatureTable, FittedFeaturePipeline};
use rrt_tree::Regressor;
use std::{
	io::{Read, Write},
	path::Path,
};

const MAJOR_VERSION: u8 = 0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FittedModel {
	pub schema: Vec<Field>,
	pub feature_pipeline: FittedFeaturePipeline,
	pub regressor: Regressor,
}

impl FittedModel {
	/// Apply the feature pipeline to `dataframe`.
	pub fn transform(&self, dataframe: &DataFrameView) -> Result<FeatureTable, Error> {
		Ok(self.feature_pipeline.transform(dataframe)?)
	}

	/// Predict the label of every row in `dataframe`.
	pub fn predict(&self, dataframe: &DataFrameView) -> Result<Array1<f32>, Error> {
		let table = self.transform(dataframe)?;
		let features = features(&table)?;
		Ok(RegressionPredictor::predict(&self.regressor, features))
	}

	/// Deserialize a `FittedModel` from a slice.
	pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
		let (major_version, slice) = slice.split_first().ok_or(Error::EmptyModel)?;
		if *major_version != MAJOR_VERSION {
			return Err(Error::UnknownMajorVersion(*major_version));
		}
		Ok(rmp_serde::from_slice(slice)?)
	}

	/// Deserialize a `FittedModel` by reading the file at `path`.
	pub fn from_path(path: &Path) -> Result<Self, Error> {
		let read_error = |source| Error::ReadModel {
			path: path.to_owned(),
			source,
		};
		let file = std::fs::File::open(path).map_err(read_error)?;
		let mut reader = std::io::BufReader::new(file);
		let mut major_version = [0u8; 1];
		reader
			.read_exact(&mut major_version)
			.map_err(|error| match error.kind() {
				std::io::ErrorKind::UnexpectedEof => Error::EmptyModel,
				_ => read_error(error),
			})?;
		let major_version = major_version[0];
		if major_version != MAJOR_VERSION {
			return Err(Error::UnknownMajorVersion(major_version));
		}
		Ok(rmp_serde::from_read(&mut reader)?)
	}

	/// Serialize this model into a byte vector.
	pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
		let mut bytes = vec![MAJOR_VERSION];
		rmp_serde::encode::write_named(&mut bytes, self)?;
		Ok(bytes)
	}

	/// Write this model to the file at `path`.
	pub fn to_path(&self, path: &Path) -> Result<(), Error> {
		let write_error = |source| Error::WriteModel {
			path: path.to_owned(),
			source,
		};
		let file = std::fs::File::create(path).map_err(write_error)?;
		let mut writer = std::io::BufWriter::new(file);
		writer.write_all(&[MAJOR_VERSION]).map_err(write_error)?;
		rmp_serde::encode::write_named(&mut writer, self)?;
		writer.flush().map_err(write_error)?;
		Ok(())
	}
}

/// The feature matrix of a transformed table.
pub fn features(table: &FeatureTable) -> Result<ArrayView2<f32>, Error> {
	table
		.vector(FEATURES_COLUMN_NAME)
		.map(|column| column.values.view())
		.ok_or_else(|| Error::MissingVectorColumn(FEATURES_COLUMN_NAME.to_owned()))
}

/// The label column of a table.
pub fn labels<'a>(dataframe: &DataFrameView<'a>) -> Result<ArrayView1<'a, f32>, Error> {
	dataframe
		.column(LABEL_COLUMN_NAME)
		.and_then(|column| column.as_number())
		.map(|column| ArrayView1::from(column.data))
		.ok_or_else(|| Error::MissingNumberColumn(LABEL_COLUMN_NAME.to_owned()))
}

#[test]
fn test_unknown_major_version() {
	let error = FittedModel::from_slice(&[1, 0x80]).unwrap_err();
	assert_eq!(error.to_string(), "unknown major version 1");
}

#[test]
fn test_empty_model() {
	let error = FittedModel::from_slice(&[]).unwrap_err();
	assert_eq!(error.to_string(), "the model is empty");
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model.zip");
	std::fs::File::create(&path).unwrap();
	let error = FittedModel::from_path(&path).unwrap_err();
	assert!(matches!(error, Error::EmptyModel));
}
