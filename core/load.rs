use crate::{schema, Error};
use rrt_dataframe::{DataFrame, FromCsvOptions};
use std::path::Path;

/// Load a simulation table, binding columns to the fields of the schema by position.
pub fn load(path: &Path, has_header: bool, delimiter: u8) -> Result<DataFrame, Error> {
	let options = FromCsvOptions {
		schema: schema::column_schema(&schema::schema()),
		has_headers: has_header,
		delimiter,
	};
	let dataframe = DataFrame::from_path(path, options, |_| {})?;
	tracing::debug!(path = %path.display(), rows = dataframe.nrows(), "loaded table");
	Ok(dataframe)
}

#[cfg(test)]
mod test {
	use super::*;
	use rrt_dataframe::LoadError;

	#[test]
	fn test_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("train.csv");
		std::fs::write(
			&path,
			"run,security,year,price,delta,isSplit,isBust,yield,avgRateOfReturn\n\
			 1,Pioneer,10,92,15,False,true,4,0.11\n\
			 2,Apex,3,40.5,-2,TRUE,False,1.25,-0.02\n",
		)
		.unwrap();
		let dataframe = load(&path, true, b',').unwrap();
		assert_eq!(dataframe.nrows(), 2);
		let view = dataframe.view();
		assert_eq!(view.column("security").unwrap().label_at(1), Some("Apex"));
		assert_eq!(view.column("isSplit").unwrap().label_at(1), Some("True"));
		assert_eq!(view.column("isBust").unwrap().label_at(0), Some("True"));
		assert_eq!(
			view.column("Label").unwrap().as_number().unwrap().data,
			&[0.11, -0.02]
		);
	}

	#[test]
	fn test_load_rejects_malformed_rows() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("train.csv");
		std::fs::write(
			&path,
			"run,security,year,price,delta,isSplit,isBust,yield,avgRateOfReturn\n\
			 1,Pioneer,ten,92,15,False,False,4,0.11\n",
		)
		.unwrap();
		let error = load(&path, true, b',').unwrap_err();
		assert!(matches!(
			error,
			Error::Load(LoadError::Parse { ref column, ref value, .. }) if column == "year" && value == "ten"
		));
	}

	#[test]
	fn test_load_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let error = load(&dir.path().join("missing.csv"), true, b',').unwrap_err();
		assert!(matches!(error, Error::Load(LoadError::NotFound { .. })));
	}
}
