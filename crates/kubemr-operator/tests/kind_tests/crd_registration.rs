//! Stories about registering the MapReduceJob resource type

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::Api;

use kubemr_common::crd::JOB_CRD_NAME;
use kubemr_operator::startup::{ensure_job_crd, is_established, CrdClientImpl, CrdOutcome};

use super::helpers::ensure_test_cluster;

/// Story: a second operator replica starts after the type is registered
///
/// Registration must see the existing type and leave it untouched.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_restart_finds_registered_type() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");

    let crds = CrdClientImpl::new(client.clone());
    let outcome = ensure_job_crd(&crds).await.expect("registration failed");
    assert_eq!(outcome, CrdOutcome::AlreadyPresent);

    let api: Api<CustomResourceDefinition> = Api::all(client);
    let crd = api.get(JOB_CRD_NAME).await.expect("CRD missing");
    assert!(is_established(&crd));
    assert_eq!(crd.spec.names.kind, "MapReduceJob");
    assert_eq!(crd.spec.group, "turbobytes.com");
}
