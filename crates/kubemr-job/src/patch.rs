//! Field-scoped partial updates for MapReduceJob
//!
//! Every write the operator makes is a JSON patch of `add` operations, one per
//! field, sent as a single request. `add` on an existing member replaces it,
//! so replaying the same patch (or racing an identical one from another
//! replica) leaves the resource in the same state.

use json_patch::{AddOperation, PatchOperation};
use jsonptr::PointerBuf;
use kube::ResourceExt;
use serde_json::Value;
use tracing::{debug, warn};

use kubemr_common::crd::{JobStatus, MapReduceJob};

use crate::client::JobClient;
use crate::error::JobError;

/// Top-level job fields the operator writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobField {
    /// `/status`
    Status,
    /// `/err`
    Err,
}

impl JobField {
    /// Member name on the resource
    pub fn key(&self) -> &'static str {
        match self {
            JobField::Status => "status",
            JobField::Err => "err",
        }
    }

    /// Absolute JSON pointer to the field
    pub fn pointer(&self) -> PointerBuf {
        PointerBuf::from_tokens([self.key()])
    }
}

/// One field and its new value
#[derive(Clone, Debug, PartialEq)]
pub struct FieldChange {
    pub field: JobField,
    pub value: Value,
}

/// Ordered set of field changes applied atomically to one job
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobPatch {
    changes: Vec<FieldChange>,
}

impl JobPatch {
    /// Move a validated job to `Pending`
    pub fn pending() -> Self {
        Self::default().set(JobField::Status, JobStatus::Pending.as_str())
    }

    /// Mark a job `Fail` with its reason; both fields travel in one request
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::default()
            .set(JobField::Status, JobStatus::Fail.as_str())
            .set(JobField::Err, reason.into())
    }

    /// Set a field, replacing an earlier change to the same field in place
    pub fn set(mut self, field: JobField, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.changes.iter_mut().find(|c| c.field == field) {
            Some(existing) => existing.value = value,
            None => self.changes.push(FieldChange { field, value }),
        }
        self
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// True when this patch writes `field`
    pub fn sets(&self, field: JobField) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }

    /// Render as RFC 6902 `add` operations, in insertion order
    pub fn to_json_patch(&self) -> json_patch::Patch {
        json_patch::Patch(
            self.changes
                .iter()
                .map(|c| {
                    PatchOperation::Add(AddOperation {
                        path: c.field.pointer(),
                        value: c.value.clone(),
                    })
                })
                .collect(),
        )
    }
}

/// Send `patch` for `job` as one request addressed by namespace and name.
///
/// The API error is returned as-is; retrying is left to the next tick.
pub async fn apply_patch(
    client: &dyn JobClient,
    job: &MapReduceJob,
    patch: &JobPatch,
) -> Result<(), JobError> {
    let name = job.metadata.name.as_deref().ok_or(JobError::MissingName)?;
    let namespace = job
        .metadata
        .namespace
        .as_deref()
        .ok_or_else(|| JobError::MissingNamespace(job.name_any()))?;

    if patch.is_empty() {
        return Ok(());
    }

    debug!(
        job = %name,
        namespace = %namespace,
        fields = ?patch.changes().iter().map(|c| c.field.key()).collect::<Vec<_>>(),
        "patching job"
    );

    client
        .patch_job(namespace, name, patch)
        .await
        .map_err(|source| {
            warn!(job = %name, namespace = %namespace, error = %source, "job patch rejected");
            JobError::Patch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            }
        })
}
