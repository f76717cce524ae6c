use std::path::PathBuf;

use polars::error::PolarsError;
use thiserror::Error;

/// Failure to produce the record table. Fatal for every binding.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("dataset {path:?} is unavailable: {reason}")]
    Unavailable { path: PathBuf, reason: String },
    #[error("dataset {path:?} is missing required columns {columns:?}")]
    MissingColumns { path: PathBuf, columns: Vec<String> },
    #[error("dataset is malformed: {error_message}")]
    Malformed { error_message: String },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Malformed {
            error_message: e.to_string(),
        }
    }
}

/// Failure of a single binding invocation. Never affects other bindings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("no binding registered for output {output:?}")]
    UnknownOutput { output: String },
    #[error("binding {output:?} is missing input {input:?}")]
    MissingInput { output: String, input: String },
    #[error("invalid value {value:?} for input {input:?}")]
    InvalidInput { input: String, value: String },
    #[error("dataset unavailable: {reason}")]
    Unavailable { reason: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server stopped: {0}")]
    Serve(#[from] std::io::Error),
}
