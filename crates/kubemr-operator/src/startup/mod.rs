//! Startup steps that run before the reconcile loop

mod crds;
mod polling;

pub use crds::{
    ensure_job_crd, is_established, wait_for_job_crd, CrdClient, CrdClientImpl, CrdOutcome,
    CRD_ESTABLISHED_TIMEOUT,
};
pub use polling::{wait_for_resource, DEFAULT_POLL_INTERVAL};
