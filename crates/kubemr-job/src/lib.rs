//! MapReduceJob reconciliation core
//!
//! Moves each job from an empty status to `Pending` (valid spec) or `Fail`
//! (invalid spec) with field-scoped JSON patches, so any number of operator
//! replicas can race over the same jobs without corrupting each other:
//! - `validate`: pure spec checks
//! - `policy`: status + verdict → transition
//! - `patch`: minimal `add` operations, applied in one request
//! - `client` / `directory`: list, patch and watch jobs
//! - `controller`: per-job processing and the fixed-interval poll loop

pub mod client;
pub mod controller;
pub mod directory;
pub mod error;
pub mod patch;
pub mod policy;
pub mod validate;

pub use client::{JobClient, JobClientImpl, JobScope};
pub use controller::{process, run_loop, run_tick, JobContext, JobOutcome, TickReport};
pub use error::JobError;
pub use patch::{FieldChange, JobField, JobPatch};
pub use policy::{decide, Transition};
pub use validate::{validate, SpecError};
