//! State-transition policy
//!
//! Only an empty status is acted on. Everything else, including states the
//! execution engine invents later, is left alone.

use kubemr_common::crd::MapReduceJob;

use crate::patch::JobPatch;
use crate::validate::{validate, SpecError};

/// What the operator should do with one job
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Status already set; nothing to do
    Settled,
    /// Spec is valid; hand the job to the execution engine
    MarkPending,
    /// Spec is invalid; terminal failure with a reason for the owner
    MarkFailed { reason: String },
}

impl Transition {
    /// Minimal patch for this transition, `None` when settled
    pub fn patch(&self) -> Option<JobPatch> {
        match self {
            Transition::Settled => None,
            Transition::MarkPending => Some(JobPatch::pending()),
            Transition::MarkFailed { reason } => Some(JobPatch::failed(reason.clone())),
        }
    }
}

/// Decide the transition for a job as observed in this tick's snapshot
pub fn decide(job: &MapReduceJob) -> Transition {
    if !job.status.is_empty() {
        return Transition::Settled;
    }
    let verdict = match &job.spec_error {
        Some(decode_error) => Err(SpecError::Malformed(decode_error.clone())),
        None => validate(&job.spec),
    };
    match verdict {
        Ok(()) => Transition::MarkPending,
        Err(e) => Transition::MarkFailed {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::JobField;
    use kubemr_common::crd::{JobStatus, MapReduceJobSpec};

    fn valid_spec() -> MapReduceJobSpec {
        MapReduceJobSpec {
            image: "wordcount:1".to_string(),
            replicas: 1,
            inputs: vec!["s3://in".to_string()],
            reduce_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn empty_valid_job_becomes_pending() {
        let job = MapReduceJob::new("j1", valid_spec()).within("ns1");
        assert_eq!(decide(&job), Transition::MarkPending);
        assert_eq!(decide(&job).patch(), Some(JobPatch::pending()));
    }

    #[test]
    fn empty_invalid_job_fails_with_reason() {
        let job = MapReduceJob::new("j2", MapReduceJobSpec::default()).within("ns1");
        let transition = decide(&job);
        assert_eq!(
            transition,
            Transition::MarkFailed {
                reason: "missing field image".to_string()
            }
        );

        let patch = transition.patch().unwrap();
        assert!(patch.sets(JobField::Status));
        assert!(patch.sets(JobField::Err));
    }

    #[test]
    fn undecodable_spec_fails_with_decode_error() {
        let job: MapReduceJob = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "j5", "namespace": "ns1" },
            "spec": { "image": "wordcount:1", "replicas": "two" }
        }))
        .unwrap();

        match decide(&job) {
            Transition::MarkFailed { reason } => {
                assert!(reason.starts_with("invalid spec: invalid type"), "{reason}")
            }
            other => panic!("expected MarkFailed, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_spec_is_ignored_once_settled() {
        let mut job: MapReduceJob = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "j6", "namespace": "ns1" },
            "spec": { "replicas": -1 },
            "status": "Fail",
            "err": "invalid spec: invalid value"
        }))
        .unwrap();
        assert!(job.spec_error.is_some());
        assert_eq!(decide(&job), Transition::Settled);

        job.status = JobStatus::Other("Running".to_string());
        assert_eq!(decide(&job), Transition::Settled);
    }

    #[test]
    fn any_non_empty_status_is_settled() {
        for status in [
            JobStatus::Pending,
            JobStatus::Fail,
            JobStatus::Other("Running".to_string()),
            JobStatus::Other("Complete".to_string()),
        ] {
            // Even an invalid spec is ignored once a status is set
            let job = MapReduceJob::new("j", MapReduceJobSpec::default())
                .within("ns1")
                .with_status(status);
            assert_eq!(decide(&job), Transition::Settled);
            assert!(decide(&job).patch().is_none());
        }
    }
}
