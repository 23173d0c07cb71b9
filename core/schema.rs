/*!
This module defines the shape of the simulation tables. Fields bind to CSV columns by position, through the explicit table in [`FIELDS`].
*/

use rrt_dataframe::{
	Column, ColumnSchema, ColumnType, DataFrame, EnumColumn, NumberColumn, TextColumn,
};
use std::num::NonZeroUsize;

/// The name the label column takes in loaded tables.
pub const LABEL_COLUMN_NAME: &str = "Label";
/// The identifier column, which never becomes a feature.
pub const RUN_COLUMN_NAME: &str = "run";
/// The name of the predicted value.
pub const SCORE_COLUMN_NAME: &str = "Score";

const BOOLEAN_OPTIONS: [&str; 2] = ["False", "True"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FieldType {
	Integer,
	Number,
	Text,
	Boolean,
}

/// A field of a [`SimulationRecord`], bound to the CSV column at `source_column_index`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub source_column_index: usize,
}

/// The fields of a simulation record, in column order.
pub const FIELDS: [(&str, FieldType); 9] = [
	("run", FieldType::Integer),
	("security", FieldType::Text),
	("year", FieldType::Number),
	("price", FieldType::Number),
	("delta", FieldType::Number),
	("isSplit", FieldType::Boolean),
	("isBust", FieldType::Boolean),
	("yield", FieldType::Number),
	(LABEL_COLUMN_NAME, FieldType::Number),
];

pub fn schema() -> Vec<Field> {
	FIELDS
		.iter()
		.enumerate()
		.map(|(source_column_index, (name, field_type))| Field {
			name: (*name).to_owned(),
			field_type: *field_type,
			source_column_index,
		})
		.collect()
}

impl FieldType {
	pub fn column_type(&self) -> ColumnType {
		match self {
			FieldType::Integer | FieldType::Number => ColumnType::Number,
			FieldType::Text => ColumnType::Text,
			FieldType::Boolean => ColumnType::Enum {
				options: BOOLEAN_OPTIONS.iter().map(|option| option.to_string()).collect(),
			},
		}
	}
}

/// The column schema the loader binds CSV records with.
pub fn column_schema(fields: &[Field]) -> Vec<ColumnSchema> {
	fields
		.iter()
		.map(|field| ColumnSchema {
			name: field.name.clone(),
			source_column_index: field.source_column_index,
			column_type: field.field_type.column_type(),
		})
		.collect()
}

/// One run of the stock price simulation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationRecord {
	pub run: i64,
	pub security: String,
	pub year: f32,
	pub price: f32,
	pub delta: f32,
	#[serde(rename = "isSplit")]
	pub is_split: bool,
	#[serde(rename = "isBust")]
	pub is_bust: bool,
	pub r#yield: f32,
	#[serde(rename = "avgRateOfReturn")]
	pub avg_rate_of_return: f32,
}

/// The output of the model for one record.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PredictionResult {
	#[serde(rename = "Score")]
	pub avg_rate_of_return: f32,
}

/// Build a table with the columns of [`schema`] from in-memory records.
pub fn records_to_dataframe(records: &[SimulationRecord]) -> DataFrame {
	let number = |name: &str, value: fn(&SimulationRecord) -> f32| {
		Column::Number(NumberColumn {
			name: name.to_owned(),
			data: records.iter().map(value).collect(),
		})
	};
	let boolean = |name: &str, value: fn(&SimulationRecord) -> bool| {
		let options: Vec<String> = BOOLEAN_OPTIONS.iter().map(|option| option.to_string()).collect();
		// Enum values are one-based, so false is 1 and true is 2.
		let data = records
			.iter()
			.map(|record| NonZeroUsize::new(value(record) as usize + 1))
			.collect();
		Column::Enum(EnumColumn {
			name: name.to_owned(),
			options,
			data,
		})
	};
	DataFrame {
		columns: vec![
			number("run", |record| record.run as f32),
			Column::Text(TextColumn {
				name: "security".to_owned(),
				data: records.iter().map(|record| record.security.clone()).collect(),
			}),
			number("year", |record| record.year),
			number("price", |record| record.price),
			number("delta", |record| record.delta),
			boolean("isSplit", |record| record.is_split),
			boolean("isBust", |record| record.is_bust),
			number("yield", |record| record.r#yield),
			number(LABEL_COLUMN_NAME, |record| record.avg_rate_of_return),
		],
	}
}

#[test]
fn test_schema() {
	let schema = schema();
	let names: Vec<&str> = schema.iter().map(|field| field.name.as_str()).collect();
	insta::assert_debug_snapshot!(names, @r###"
 [
     "run",
     "security",
     "year",
     "price",
     "delta",
     "isSplit",
     "isBust",
     "yield",
     "Label",
 ]
 "###);
	assert_eq!(schema[8].source_column_index, 8);
}

#[test]
fn test_records_to_dataframe() {
	let record = SimulationRecord {
		run: 1,
		security: "Apex".to_owned(),
		year: 2.0,
		price: 50.0,
		delta: -3.0,
		is_split: true,
		is_bust: false,
		r#yield: 1.5,
		avg_rate_of_return: 0.01,
	};
	let dataframe = records_to_dataframe(&[record]);
	let schema = schema();
	let names: Vec<&str> = schema.iter().map(|field| field.name.as_str()).collect();
	assert_eq!(dataframe.column_names(), names);
	assert_eq!(dataframe.view().columns[5].label_at(0), Some("True"));
	assert_eq!(dataframe.view().columns[6].label_at(0), Some("False"));
}
