//! Integration tests for the kubemr operator
//!
//! - `crd_registration`: the operator registers the MapReduceJob type and
//!   tolerates it already being there
//! - `job_lifecycle`: jobs move from an empty status to Pending or Fail and
//!   are left alone afterwards

mod crd_registration;
mod helpers;
mod job_lifecycle;
