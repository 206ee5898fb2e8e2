//! kubemr operator: validates MapReduceJobs and marks them Pending or Fail

#![deny(missing_docs)]

/// Command-line and environment configuration
pub mod config;
/// Startup steps (resource type registration)
pub mod startup;
