//! Stroke patients dashboard: loads a patient table once, aggregates it per
//! chart and serves the charts over HTTP, recomputing a chart whenever its
//! filter control changes.

pub mod aggregate;
pub mod binding;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod palette;
pub mod records;
pub mod server;

pub use binding::{InputSource, InputValues, Output, Registry};
pub use chart::{ChartKind, ChartSpec};
pub use dataset::Dataset;
pub use error::{BindingError, DataError, ServerError};
pub use records::{Outcome, PatientRecord};
