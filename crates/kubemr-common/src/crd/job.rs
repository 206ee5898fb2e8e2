//! MapReduceJob resource types
//!
//! A `MapReduceJob` keeps `status` and `err` as plain top-level string fields
//! rather than a status subresource, so a single JSON patch against the main
//! resource endpoint can set both at once.

use std::borrow::Cow;
use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::NamespaceResourceScope;
use kube::api::TypeMeta;
use kube::Resource;
use serde::{Deserialize, Serialize};

/// API group of the MapReduceJob resource
pub const JOB_GROUP: &str = "turbobytes.com";
/// Served and stored API version
pub const JOB_VERSION: &str = "v1alpha1";
/// Resource kind
pub const JOB_KIND: &str = "MapReduceJob";
/// Plural resource name used in URL paths
pub const JOB_PLURAL: &str = "mapreducejobs";
/// Singular resource name
pub const JOB_SINGULAR: &str = "mapreducejob";
/// kubectl short name
pub const JOB_SHORT_NAME: &str = "mrj";

// =============================================================================
// Status
// =============================================================================

/// Lifecycle status of a MapReduceJob.
///
/// Only `Empty`, `Pending` and `Fail` are produced by the operator. Every
/// other value belongs to the execution engine and is carried verbatim in
/// `Other`, so the vocabulary can grow without a release here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum JobStatus {
    /// Freshly created, not yet looked at
    #[default]
    Empty,
    /// Spec validated; ready for the execution engine
    Pending,
    /// Spec rejected; `err` holds the reason
    Fail,
    /// A state owned by the execution engine
    Other(String),
}

impl JobStatus {
    /// Wire value of this status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Pending => "Pending",
            Self::Fail => "Fail",
            Self::Other(s) => s,
        }
    }

    /// True for a job nothing has touched yet
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "" => Self::Empty,
            "Pending" => Self::Pending,
            "Fail" => Self::Fail,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" | "Pending" | "Fail" => Self::from(s.as_str()),
            _ => Self::Other(s),
        }
    }
}

impl From<Option<String>> for JobStatus {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

// =============================================================================
// Spec
// =============================================================================

/// User-supplied job definition.
///
/// Every field is defaulted: a job with missing or empty fields still
/// deserializes and is rejected by validation with a readable reason.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapReduceJobSpec {
    /// Container image implementing the map and reduce phases
    #[serde(default)]
    pub image: String,

    /// Number of worker replicas
    #[serde(default)]
    pub replicas: u32,

    /// Input locations, one map task each
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Number of reduce partitions
    #[serde(default)]
    pub reduce_count: u32,

    /// Extra arguments passed to the job image
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Environment variables for the job image
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

// =============================================================================
// Resource
// =============================================================================

/// A map-reduce job tracked by the operator
///
/// Decoding never fails on the `spec` body: a spec with wrongly typed fields
/// decodes to the default spec and keeps the decode error in `spec_error`,
/// so one malformed object cannot make a whole list unreadable.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(from = "RawMapReduceJob")]
pub struct MapReduceJob {
    /// apiVersion and kind
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,

    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Job definition
    #[serde(default)]
    pub spec: MapReduceJobSpec,

    /// Lifecycle status (absent means `Empty`)
    #[serde(default, skip_serializing_if = "JobStatus::is_empty")]
    pub status: JobStatus,

    /// Diagnostic set together with `status: Fail`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,

    /// Why the stored `spec` could not be decoded, if it could not
    #[serde(skip)]
    pub spec_error: Option<String>,
}

/// Wire shape of a MapReduceJob with the spec left undecoded
#[derive(Deserialize)]
struct RawMapReduceJob {
    #[serde(flatten, default)]
    types: Option<TypeMeta>,
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default)]
    spec: serde_json::Value,
    #[serde(default)]
    status: JobStatus,
    #[serde(default)]
    err: Option<String>,
}

impl From<RawMapReduceJob> for MapReduceJob {
    fn from(raw: RawMapReduceJob) -> Self {
        let (spec, spec_error) = match raw.spec {
            serde_json::Value::Null => (MapReduceJobSpec::default(), None),
            value => match serde_json::from_value(value) {
                Ok(spec) => (spec, None),
                Err(e) => (MapReduceJobSpec::default(), Some(e.to_string())),
            },
        };
        Self {
            types: raw.types,
            metadata: raw.metadata,
            spec,
            status: raw.status,
            err: raw.err,
            spec_error,
        }
    }
}

impl MapReduceJob {
    /// Create a new job with the given name and spec, status `Empty`
    pub fn new(name: &str, spec: MapReduceJobSpec) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: format!("{JOB_GROUP}/{JOB_VERSION}"),
                kind: JOB_KIND.to_string(),
            }),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec,
            status: JobStatus::Empty,
            err: None,
            spec_error: None,
        }
    }

    /// Set the namespace (builder style)
    pub fn within(mut self, namespace: &str) -> Self {
        self.metadata.namespace = Some(namespace.to_string());
        self
    }

    /// Set the status (builder style)
    pub fn with_status(mut self, status: impl Into<JobStatus>) -> Self {
        self.status = status.into();
        self
    }
}

impl Resource for MapReduceJob {
    type DynamicType = ();
    type Scope = NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(JOB_KIND)
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(JOB_GROUP)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(JOB_VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(JOB_PLURAL)
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

// =============================================================================
// Tests
// =============================================================================
