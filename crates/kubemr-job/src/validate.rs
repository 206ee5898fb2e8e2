//! MapReduceJob spec validation
//!
//! Pure and deterministic: the same spec always yields the same verdict, and
//! the first failing rule (in a fixed order) decides the reason. A job whose
//! patch failed is re-validated on the next tick and must get the same answer.

use kubemr_common::crd::MapReduceJobSpec;

/// Upper bound on worker replicas for a single job
pub const MAX_REPLICAS: u32 = 1000;

/// Why a spec was rejected. The `Display` text is written to the job's `err`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// The stored spec has wrongly typed fields and could not be decoded
    #[error("invalid spec: {0}")]
    Malformed(String),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid image \"{0}\": contains whitespace")]
    InvalidImage(String),

    #[error("replicas must be at least 1")]
    NoReplicas,

    #[error("replicas must be at most {MAX_REPLICAS}")]
    TooManyReplicas,

    #[error("input {0} is empty")]
    EmptyInput(usize),

    #[error("reduceCount must be at least 1")]
    NoReducers,

    #[error("invalid env var name \"{0}\"")]
    InvalidEnvName(String),
}

/// Validate a job spec
pub fn validate(spec: &MapReduceJobSpec) -> Result<(), SpecError> {
    if spec.image.is_empty() {
        return Err(SpecError::MissingField("image"));
    }
    if spec.image.chars().any(char::is_whitespace) {
        return Err(SpecError::InvalidImage(spec.image.clone()));
    }

    if spec.replicas == 0 {
        return Err(SpecError::NoReplicas);
    }
    if spec.replicas > MAX_REPLICAS {
        return Err(SpecError::TooManyReplicas);
    }

    if spec.inputs.is_empty() {
        return Err(SpecError::MissingField("inputs"));
    }
    if let Some(index) = spec.inputs.iter().position(|i| i.trim().is_empty()) {
        return Err(SpecError::EmptyInput(index));
    }

    if spec.reduce_count == 0 {
        return Err(SpecError::NoReducers);
    }

    if let Some(key) = spec.env.keys().find(|k| !is_env_name(k)) {
        return Err(SpecError::InvalidEnvName(key.clone()));
    }

    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
