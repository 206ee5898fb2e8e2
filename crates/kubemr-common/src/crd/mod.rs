//! Custom resource types for kubemr
//!
//! The operator manages a single resource, `MapReduceJob`, and registers its
//! type descriptor on startup.

mod descriptor;
mod job;

pub use descriptor::{job_crd, job_crd_yaml, JOB_CRD_DESCRIPTION, JOB_CRD_NAME};
pub use job::{
    JobStatus, MapReduceJob, MapReduceJobSpec, JOB_GROUP, JOB_KIND, JOB_PLURAL, JOB_SHORT_NAME,
    JOB_SINGULAR, JOB_VERSION,
};
