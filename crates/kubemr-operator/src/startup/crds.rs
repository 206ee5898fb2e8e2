//! MapReduceJob resource type registration
//!
//! Runs once before the loop starts. Fetch by name; if present, do nothing.
//! Otherwise create it. Another replica creating it first (409) counts as
//! present; any other create failure aborts startup.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

use kubemr_common::crd::{job_crd, JOB_CRD_NAME};
use kubemr_common::{Error, FIELD_MANAGER};

use super::polling::{wait_for_resource, DEFAULT_POLL_INTERVAL};

/// How long to wait for a freshly created CRD to be served
pub const CRD_ESTABLISHED_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait abstracting CustomResourceDefinition reads and writes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CrdClient: Send + Sync {
    /// Get a CRD by name; `Ok(None)` when it does not exist
    async fn get_crd(&self, name: &str) -> Result<Option<CustomResourceDefinition>, Error>;

    /// Create a CRD
    async fn create_crd(&self, crd: &CustomResourceDefinition) -> Result<(), Error>;
}

/// Real Kubernetes client implementation
pub struct CrdClientImpl {
    client: Client,
}

impl CrdClientImpl {
    /// Create a new CrdClientImpl wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CrdClient for CrdClientImpl {
    async fn get_crd(&self, name: &str) -> Result<Option<CustomResourceDefinition>, Error> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await?)
    }

    async fn create_crd(&self, crd: &CustomResourceDefinition) -> Result<(), Error> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        api.create(&params, crd).await?;
        Ok(())
    }
}

/// Result of the registration step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrdOutcome {
    /// Already registered (by us earlier, an admin, or a racing replica)
    AlreadyPresent,
    /// Created by this call
    Created,
}

/// Ensure the MapReduceJob CRD exists
pub async fn ensure_job_crd(client: &dyn CrdClient) -> Result<CrdOutcome, Error> {
    match client.get_crd(JOB_CRD_NAME).await {
        Ok(Some(_)) => {
            info!(crd = JOB_CRD_NAME, "MapReduceJob CRD exists");
            return Ok(CrdOutcome::AlreadyPresent);
        }
        Ok(None) => {}
        // Could not confirm either way; let create decide
        Err(e) => warn!(crd = JOB_CRD_NAME, error = %e, "failed to get CRD, trying to create it"),
    }

    match client.create_crd(&job_crd()).await {
        Ok(()) => {
            info!(crd = JOB_CRD_NAME, "MapReduceJob CRD created");
            Ok(CrdOutcome::Created)
        }
        Err(e) if e.is_conflict() => {
            info!(crd = JOB_CRD_NAME, "MapReduceJob CRD created concurrently");
            Ok(CrdOutcome::AlreadyPresent)
        }
        Err(e) => Err(Error::bootstrap_with_context(
            "crd",
            format!("failed to create {}: {}", JOB_CRD_NAME, e),
        )),
    }
}

/// True once the API server reports the CRD as Established
pub fn is_established(crd: &CustomResourceDefinition) -> bool {
    crd.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Established" && c.status == "True")
        })
        .unwrap_or(false)
}

/// Wait until a newly created CRD is served.
///
/// Not fatal: if it times out the first ticks fail to list and retry.
pub async fn wait_for_job_crd(client: &dyn CrdClient, timeout: Duration) {
    let result = wait_for_resource(
        "MapReduceJob CRD to be established",
        timeout,
        DEFAULT_POLL_INTERVAL,
        || async {
            match client.get_crd(JOB_CRD_NAME).await {
                Ok(Some(crd)) if is_established(&crd) => Ok(Some(())),
                Ok(_) => Ok(None),
                Err(e) => Err(e.to_string()),
            }
        },
    )
    .await;

    if let Err(e) = result {
        warn!(error = %e, "continuing without an established CRD");
    }
}
