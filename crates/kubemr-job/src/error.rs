//! Job-specific error types

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("failed to list MapReduceJobs: {source}")]
    List { source: kubemr_common::Error },

    #[error("failed to patch MapReduceJob {namespace}/{name}: {source}")]
    Patch {
        namespace: String,
        name: String,
        source: kubemr_common::Error,
    },

    #[error("MapReduceJob has no name")]
    MissingName,

    #[error("MapReduceJob '{0}' has no namespace")]
    MissingNamespace(String),
}

impl JobError {
    /// True when a later tick may succeed without anyone touching the job
    pub fn is_retryable(&self) -> bool {
        match self {
            JobError::List { source } | JobError::Patch { source, .. } => source.is_retryable(),
            JobError::MissingName | JobError::MissingNamespace(_) => false,
        }
    }
}
