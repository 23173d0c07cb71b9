/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. It only implements the features needed to load the stock simulation tables and hand them to the feature pipeline.
*/

#![allow(clippy::tabs_in_doc_comments)]

use std::num::NonZeroUsize;

mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrameView<'a> {
	pub columns: Vec<ColumnView<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Number(NumberColumn),
	Enum(EnumColumn),
	Text(TextColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// Enum values are stored as one-based indexes into `options`. `None` marks a value that did not match any option.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnView<'a> {
	Number(NumberColumnView<'a>),
	Enum(EnumColumnView<'a>),
	Text(TextColumnView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumnView<'a> {
	pub name: &'a str,
	pub options: &'a [String],
	pub data: &'a [Option<NonZeroUsize>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Number,
	Enum { options: Vec<String> },
	Text,
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn view(&self) -> DataFrameView {
		let columns = self.columns.iter().map(|column| column.view()).collect();
		DataFrameView { columns }
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	/// The name of this column's type, as it appears in reports.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Number(_) => "Number",
			Self::Enum(_) => "Enum",
			Self::Text(_) => "Text",
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumn> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn view(&self) -> ColumnView {
		match self {
			Self::Number(column) => ColumnView::Number(column.view()),
			Self::Enum(column) => ColumnView::Enum(column.view()),
			Self::Text(column) => ColumnView::Text(column.view()),
		}
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> NumberColumnView {
		NumberColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> EnumColumnView {
		EnumColumnView {
			name: &self.name,
			data: &self.data,
			options: &self.options,
		}
	}

	/// Find the one-based index of `value` among this column's options.
	pub fn option_index(&self, value: &str) -> Option<NonZeroUsize> {
		option_index(&self.options, value)
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> TextColumnView {
		TextColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl<'a> DataFrameView<'a> {
	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn view(&self) -> Self {
		self.clone()
	}

	pub fn column(&self, name: &str) -> Option<&ColumnView<'a>> {
		self.columns.iter().find(|column| column.name() == name)
	}
}

impl<'a> ColumnView<'a> {
	pub fn len(&self) -> usize {
		match self {
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &'a str {
		match self {
			Self::Number(s) => s.name,
			Self::Enum(s) => s.name,
			Self::Text(s) => s.name,
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumnView<'a>> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumnView<'a>> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumnView<'a>> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Number(_) => "Number",
			Self::Enum(_) => "Enum",
			Self::Text(_) => "Text",
		}
	}

	pub fn to_column(&self) -> Column {
		match self {
			Self::Number(s) => Column::Number(NumberColumn {
				name: s.name.to_owned(),
				data: s.data.to_owned(),
			}),
			Self::Enum(s) => Column::Enum(EnumColumn {
				name: s.name.to_owned(),
				options: s.options.to_owned(),
				data: s.data.to_owned(),
			}),
			Self::Text(s) => Column::Text(TextColumn {
				name: s.name.to_owned(),
				data: s.data.to_owned(),
			}),
		}
	}

	/// Retrieve the value at `index` as a string, if this column holds strings. Enum values that did not match an option yield `None`.
	pub fn label_at(&self, index: usize) -> Option<&'a str> {
		match self {
			Self::Enum(column) => column.data[index].map(|i| column.options[i.get() - 1].as_str()),
			Self::Text(column) => Some(column.data[index].as_str()),
			_ => None,
		}
	}
}

pub(crate) fn option_index(options: &[String], value: &str) -> Option<NonZeroUsize> {
	options
		.iter()
		.position(|option| option.eq_ignore_ascii_case(value))
		.and_then(|position| NonZeroUsize::new(position + 1))
}

#[test]
fn test_label_at() {
	let column = Column::Enum(EnumColumn {
		name: "isSplit".to_owned(),
		options: vec!["False".to_owned(), "True".to_owned()],
		data: vec![NonZeroUsize::new(2), None],
	});
	let view = column.view();
	assert_eq!(view.label_at(0), Some("True"));
	assert_eq!(view.label_at(1), None);
}
