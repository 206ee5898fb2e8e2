//! Common types for kubemr: the MapReduceJob resource, errors, and utilities

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Field manager recorded on every write the operator performs
pub const FIELD_MANAGER: &str = "kubemr-operator";
