//! Test helpers for kind-backed integration tests

use std::process::Command;
use std::sync::OnceLock;

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::{Client, Config};
use tokio::sync::OnceCell;

use kubemr_common::crd::MapReduceJob;
use kubemr_operator::startup::{
    ensure_job_crd, wait_for_job_crd, CrdClientImpl, CRD_ESTABLISHED_TIMEOUT,
};

/// Name of the kind cluster used for integration tests
pub const TEST_CLUSTER_NAME: &str = "kubemr-integration-test";

static CLUSTER_INIT: OnceLock<Result<(), String>> = OnceLock::new();
static CRD_INSTALLED: OnceCell<Result<(), String>> = OnceCell::const_new();

fn kind_cluster_exists(name: &str) -> Result<bool, String> {
    let output = Command::new("kind")
        .args(["get", "clusters"])
        .output()
        .map_err(|e| format!("failed to run kind: {e}"))?;

    let clusters = String::from_utf8_lossy(&output.stdout);
    Ok(clusters.lines().any(|line| line.trim() == name))
}

fn create_kind_cluster(name: &str) -> Result<(), String> {
    if kind_cluster_exists(name)? {
        println!("Kind cluster '{name}' already exists, reusing it");
        return Ok(());
    }

    println!("Creating kind cluster '{name}'...");
    let output = Command::new("kind")
        .args(["create", "cluster", "--name", name, "--wait", "60s"])
        .output()
        .map_err(|e| format!("failed to run kind: {e}"))?;

    if !output.status.success() {
        return Err(format!(
            "failed to create kind cluster: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(())
}

async fn create_test_client() -> Result<Client, String> {
    let config = Config::from_kubeconfig(&kube::config::KubeConfigOptions {
        context: Some(format!("kind-{TEST_CLUSTER_NAME}")),
        ..Default::default()
    })
    .await
    .map_err(|e| format!("failed to load kubeconfig: {e}"))?;

    Client::try_from(config).map_err(|e| format!("failed to create client: {e}"))
}

/// Ensure the test cluster exists and the MapReduceJob type is registered
///
/// Returns a fresh Client for each call.
pub async fn ensure_test_cluster() -> Result<Client, String> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    CLUSTER_INIT
        .get_or_init(|| create_kind_cluster(TEST_CLUSTER_NAME))
        .clone()?;

    let client = create_test_client().await?;

    CRD_INSTALLED
        .get_or_init(|| async {
            let crds = CrdClientImpl::new(create_test_client().await?);
            ensure_job_crd(&crds)
                .await
                .map_err(|e| format!("failed to register CRD: {e}"))?;
            wait_for_job_crd(&crds, CRD_ESTABLISHED_TIMEOUT).await;
            Ok(())
        })
        .await
        .clone()?;

    Ok(client)
}

/// Create a fresh namespace so tests don't see each other's jobs
pub async fn fresh_namespace(client: &Client, name: &str) {
    let api: Api<Namespace> = Api::all(client.clone());
    let _ = api.delete(name, &DeleteParams::default()).await;

    // A namespace being deleted rejects creates until it is gone
    for _ in 0..60 {
        if api.get_opt(name).await.ok().flatten().is_none() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    api.create(&PostParams::default(), &ns)
        .await
        .expect("failed to create namespace");
}

/// Delete a test namespace and everything in it
pub async fn cleanup_namespace(client: &Client, name: &str) {
    let api: Api<Namespace> = Api::all(client.clone());
    let _ = api.delete(name, &DeleteParams::default()).await;
}

/// Create a job as a user would
pub async fn create_job(client: &Client, job: &MapReduceJob) -> MapReduceJob {
    let ns = job.metadata.namespace.as_deref().expect("job needs a namespace");
    let api: Api<MapReduceJob> = Api::namespaced(client.clone(), ns);
    api.create(&PostParams::default(), job)
        .await
        .expect("failed to create job")
}

/// Read a job back from the API server
pub async fn get_job(client: &Client, namespace: &str, name: &str) -> MapReduceJob {
    let api: Api<MapReduceJob> = Api::namespaced(client.clone(), namespace);
    api.get(name).await.expect("failed to get job")
}
