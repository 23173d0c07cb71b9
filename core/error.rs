use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Load(#[from] rrt_dataframe::LoadError),
	#[error(transparent)]
	Feature(#[from] rrt_features::FeatureError),
	#[error("failed to read config file {path}")]
	ReadConfig {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to parse config file {path}")]
	ParseConfig {
		path: PathBuf,
		source: serde_yaml::Error,
	},
	#[error("the table has no number column named \"{0}\"")]
	MissingNumberColumn(String),
	#[error("the table has no vector column named \"{0}\"")]
	MissingVectorColumn(String),
	#[error("cannot train on an empty table")]
	EmptyTable,
	#[error("failed to write model file {path}")]
	WriteModel {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to read model file {path}")]
	ReadModel {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to encode the model")]
	EncodeModel(#[from] rmp_serde::encode::Error),
	#[error("failed to decode the model")]
	DecodeModel(#[from] rmp_serde::decode::Error),
	#[error("unknown major version {0}")]
	UnknownMajorVersion(u8),
	#[error("the model is empty")]
	EmptyModel,
}
