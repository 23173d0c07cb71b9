use super::*;
use std::{
	io::Read,
	path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("the file {} does not exist", path.display())]
	NotFound { path: PathBuf },
	#[error("line {line}: column \"{column}\" expected {expected} but found \"{value}\"")]
	Parse {
		line: u64,
		column: String,
		expected: &'static str,
		value: String,
	},
	#[error("line {line}: column \"{column}\" is bound to field {index} but the record has {len} fields")]
	MissingField {
		line: u64,
		column: String,
		index: usize,
		len: usize,
	},
	#[error("line {line}: the record is not valid utf-8")]
	Utf8 { line: u64 },
	#[error(transparent)]
	Csv(#[from] csv::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// A `ColumnSchema` binds one csv field, by position, to a typed column. Values in columns loaded this way must parse as the declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSchema {
	pub name: String,
	pub source_column_index: usize,
	pub column_type: ColumnType,
}

/// Options for loading a csv. Every column of the dataframe is declared in `schema`, and every value must parse as its column's type.
#[derive(Clone, Debug)]
pub struct FromCsvOptions {
	pub schema: Vec<ColumnSchema>,
	pub has_headers: bool,
	pub delimiter: u8,
}

impl DataFrame {
	pub fn from_path(
		path: &Path,
		options: FromCsvOptions,
		progress: impl Fn(u64),
	) -> Result<Self, LoadError> {
		let file = match std::fs::File::open(path) {
			Ok(file) => file,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
				return Err(LoadError::NotFound {
					path: path.to_owned(),
				})
			}
			Err(error) => return Err(error.into()),
		};
		let mut reader = csv::ReaderBuilder::new()
			.has_headers(options.has_headers)
			.delimiter(options.delimiter)
			.from_reader(std::io::BufReader::new(file));
		Self::from_csv(&mut reader, options, progress)
	}

	/// Load a dataframe from a csv reader. The reader's own header and delimiter settings are used, so only `options.schema` applies.
	pub fn from_csv<R>(
		reader: &mut csv::Reader<R>,
		options: FromCsvOptions,
		progress: impl Fn(u64),
	) -> Result<Self, LoadError>
	where
		R: Read,
	{
		let schema = options.schema.as_slice();
		let column_names = schema.iter().map(|column| column.name.clone()).collect();
		let column_types = schema
			.iter()
			.map(|column| column.column_type.clone())
			.collect();
		let mut dataframe = Self::new(column_names, column_types);
		let mut record = csv::ByteRecord::new();
		while reader.read_byte_record(&mut record)? {
			let position = record
				.position()
				.cloned()
				.unwrap_or_else(csv::Position::new);
			let line = position.line();
			progress(position.byte());
			for (column, column_schema) in dataframe.columns.iter_mut().zip(schema.iter()) {
				let value = record
					.get(column_schema.source_column_index)
					.ok_or_else(|| LoadError::MissingField {
						line,
						column: column_schema.name.clone(),
						index: column_schema.source_column_index,
						len: record.len(),
					})?;
				let value = std::str::from_utf8(value)
					.map_err(|_| LoadError::Utf8 { line })?
					.trim();
				let parse_error = |expected: &'static str| LoadError::Parse {
					line,
					column: column_schema.name.clone(),
					expected,
					value: value.to_owned(),
				};
				match column {
					Column::Number(column) => {
						let value = lexical::parse::<f32, _>(value)
							.ok()
							.filter(|value| value.is_finite())
							.ok_or_else(|| parse_error("a number"))?;
						column.data.push(value);
					}
					Column::Enum(column) => {
						let value = column
							.option_index(value)
							.ok_or_else(|| parse_error("one of the enum options"))?;
						column.data.push(Some(value));
					}
					Column::Text(column) => column.data.push(value.to_owned()),
				}
			}
		}
		Ok(dataframe)
	}
}

#[cfg(test)]
fn schema() -> Vec<ColumnSchema> {
	vec![
		ColumnSchema {
			name: "security".to_owned(),
			source_column_index: 1,
			column_type: ColumnType::Text,
		},
		ColumnSchema {
			name: "isSplit".to_owned(),
			source_column_index: 2,
			column_type: ColumnType::Enum {
				options: vec!["False".to_owned(), "True".to_owned()],
			},
		},
		ColumnSchema {
			name: "Label".to_owned(),
			source_column_index: 3,
			column_type: ColumnType::Number,
		},
	]
}

#[test]
fn test_schema_binds_fields_by_position() {
	let csv = r#"run,security,isSplit,avgRateOfReturn
1,Pioneer,True,0.25
2,Acme,false,-0.5
"#;
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			schema: schema(),
			has_headers: true,
			delimiter: b',',
		},
		|_| {},
	)
	.unwrap();
	assert_eq!(df.column_names(), vec!["security", "isSplit", "Label"]);
	assert_eq!(
		df.column("security").unwrap().as_text().unwrap().data,
		vec!["Pioneer".to_owned(), "Acme".to_owned()]
	);
	assert_eq!(
		df.column("isSplit").unwrap().as_enum().unwrap().data,
		vec![NonZeroUsize::new(2), NonZeroUsize::new(1)]
	);
	assert_eq!(
		df.column("Label").unwrap().as_number().unwrap().data,
		vec![0.25, -0.5]
	);
}

#[test]
fn test_schema_rejects_values_of_the_wrong_type() {
	let csv = r#"run,security,isSplit,avgRateOfReturn
1,Pioneer,True,0.25
2,Acme,maybe,-0.5
"#;
	let error = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			schema: schema(),
			has_headers: true,
			delimiter: b',',
		},
		|_| {},
	)
	.unwrap_err();
	match error {
		LoadError::Parse {
			line,
			column,
			value,
			..
		} => {
			assert_eq!(line, 3);
			assert_eq!(column, "isSplit");
			assert_eq!(value, "maybe");
		}
		error => panic!("unexpected error {:?}", error),
	}
}

#[test]
fn test_schema_rejects_short_records() {
	let csv = "run,security,isSplit,avgRateOfReturn\n1,Pioneer,True\n";
	let error = DataFrame::from_csv(
		&mut csv::ReaderBuilder::new()
			.flexible(true)
			.from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			schema: schema(),
			has_headers: true,
			delimiter: b',',
		},
		|_| {},
	)
	.unwrap_err();
	assert!(matches!(error, LoadError::MissingField { index: 3, .. }));
}

#[test]
fn test_from_path_reports_missing_files() {
	let error = DataFrame::from_path(
		Path::new("does/not/exist.csv"),
		FromCsvOptions {
			schema: schema(),
			has_headers: true,
			delimiter: b',',
		},
		|_| {},
	)
	.unwrap_err();
	assert!(matches!(error, LoadError::NotFound { .. }));
}
