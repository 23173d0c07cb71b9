/*!
This crate runs the stock rate-of-return regression workflow. It loads the simulation tables, fits a feature pipeline and a gradient boosted tree regressor, evaluates the model, makes a prediction for a single record, writes the model to disk and ranks the features by permutation importance.

Each step is exposed on its own, and [`run`] sequences them.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod error;

pub mod config;
pub mod features;
pub mod importance;
pub mod load;
pub mod model;
pub mod path;
pub mod predict;
pub mod regressor;
pub mod report;
pub mod run;
pub mod schema;
pub mod test;
pub mod train;

pub use self::{
	config::{Config, Context},
	error::Error,
	model::FittedModel,
	run::{run, RunOptions, RunOutcome, RunReport},
};
