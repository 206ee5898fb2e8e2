//! Job directory access: list and patch MapReduceJobs
//!
//! Every tick reads jobs fresh from the API server; nothing is cached between
//! ticks, so the state a replica acts on is never older than its last list.

use async_trait::async_trait;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::Client;

#[cfg(test)]
use mockall::automock;

use kubemr_common::crd::MapReduceJob;
use kubemr_common::{Error, FIELD_MANAGER};

use crate::patch::JobPatch;

/// Trait abstracting the Kubernetes calls the reconciliation loop makes
///
/// Lets tests observe every outbound patch without an API server.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobClient: Send + Sync {
    /// List all MapReduceJobs in scope, in API server order
    async fn list_jobs(&self) -> Result<Vec<MapReduceJob>, Error>;

    /// Apply a field-scoped JSON patch to one job
    async fn patch_job(&self, namespace: &str, name: &str, patch: &JobPatch)
        -> Result<(), Error>;
}

/// Which jobs the operator looks at
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum JobScope {
    /// Every namespace
    #[default]
    Cluster,
    /// A single namespace
    Namespace(String),
}

impl JobScope {
    /// Scope from an optional namespace; `None` or empty means cluster-wide
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(ns) if !ns.is_empty() => JobScope::Namespace(ns.to_string()),
            _ => JobScope::Cluster,
        }
    }

    /// Api handle for listing and watching within this scope
    pub fn api(&self, client: Client) -> Api<MapReduceJob> {
        match self {
            JobScope::Cluster => Api::all(client),
            JobScope::Namespace(ns) => Api::namespaced(client, ns),
        }
    }
}

/// Real Kubernetes client implementation
pub struct JobClientImpl {
    client: Client,
    scope: JobScope,
}

impl JobClientImpl {
    /// Create a new JobClientImpl wrapping the given kube Client
    pub fn new(client: Client, scope: JobScope) -> Self {
        Self { client, scope }
    }

    /// Api handle for the configured scope
    pub fn api(&self) -> Api<MapReduceJob> {
        self.scope.api(self.client.clone())
    }
}

#[async_trait]
impl JobClient for JobClientImpl {
    async fn list_jobs(&self) -> Result<Vec<MapReduceJob>, Error> {
        let list = self.api().list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn patch_job(
        &self,
        namespace: &str,
        name: &str,
        patch: &JobPatch,
    ) -> Result<(), Error> {
        let api: Api<MapReduceJob> = Api::namespaced(self.client.clone(), namespace);
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        let patch: Patch<()> = Patch::Json(patch.to_json_patch());
        api.patch(name, &params, &patch).await?;
        Ok(())
    }
}
