//! Stories about how jobs move through the operator

use std::collections::BTreeMap;
use std::sync::Arc;

use kube::api::{Api, ApiResource, DynamicObject, PostParams};
use kube::Client;

use kubemr_common::crd::{JobStatus, MapReduceJob, MapReduceJobSpec};
use kubemr_job::{run_tick, JobClient, JobClientImpl, JobScope};

use super::helpers::{
    cleanup_namespace, create_job, ensure_test_cluster, fresh_namespace, get_job,
};

fn valid_spec() -> MapReduceJobSpec {
    MapReduceJobSpec {
        image: "turbobytes/wordcount:1.0".to_string(),
        replicas: 2,
        inputs: vec!["s3://corpus/part-0".to_string()],
        reduce_count: 1,
        args: vec!["--lower".to_string()],
        env: BTreeMap::from([("LANG".to_string(), "C".to_string())]),
    }
}

fn scoped_client(client: &Client, namespace: &str) -> Arc<dyn JobClient> {
    Arc::new(JobClientImpl::new(
        client.clone(),
        JobScope::Namespace(namespace.to_string()),
    ))
}

/// Story: a user submits a well-formed job
///
/// The first tick marks it Pending without an err; the next tick leaves it.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_valid_job_becomes_pending() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "kubemr-test-valid";
    fresh_namespace(&client, ns).await;

    create_job(&client, &MapReduceJob::new("wordcount", valid_spec()).within(ns)).await;

    let jobs = scoped_client(&client, ns);
    let report = run_tick(jobs.as_ref()).await.expect("tick failed");
    assert_eq!(report.seen, 1);
    assert_eq!(report.pending, 1);

    let job = get_job(&client, ns, "wordcount").await;
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.err.is_none());
    assert_eq!(job.spec, valid_spec());

    let version = job.metadata.resource_version.clone();
    let report = run_tick(jobs.as_ref()).await.expect("tick failed");
    assert_eq!(report.settled, 1);
    assert_eq!(
        get_job(&client, ns, "wordcount").await.metadata.resource_version,
        version
    );

    cleanup_namespace(&client, ns).await;
}

/// Story: a user submits a job with no image
///
/// The tick marks it Fail and records why in `err`, in the same write.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_invalid_job_fails_with_reason() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "kubemr-test-invalid";
    fresh_namespace(&client, ns).await;

    let spec = MapReduceJobSpec {
        image: String::new(),
        ..valid_spec()
    };
    create_job(&client, &MapReduceJob::new("broken", spec).within(ns)).await;

    let jobs = scoped_client(&client, ns);
    let report = run_tick(jobs.as_ref()).await.expect("tick failed");
    assert_eq!(report.failed, 1);

    let job = get_job(&client, ns, "broken").await;
    assert_eq!(job.status, JobStatus::Fail);
    assert_eq!(job.err.as_deref(), Some("missing field image"));

    cleanup_namespace(&client, ns).await;
}

/// Story: the execution engine has already moved a job on
///
/// Jobs with any status set are never written by the operator.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_engine_owned_job_is_left_alone() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "kubemr-test-engine";
    fresh_namespace(&client, ns).await;

    let job = MapReduceJob::new("running", MapReduceJobSpec::default())
        .within(ns)
        .with_status(JobStatus::Other("Running".to_string()));
    let created = create_job(&client, &job).await;

    let jobs = scoped_client(&client, ns);
    let report = run_tick(jobs.as_ref()).await.expect("tick failed");
    assert_eq!(report.settled, 1);

    let job = get_job(&client, ns, "running").await;
    assert_eq!(job.status, JobStatus::Other("Running".to_string()));
    assert_eq!(job.metadata.resource_version, created.metadata.resource_version);

    cleanup_namespace(&client, ns).await;
}

/// Story: a user submits a job with a wrongly typed field
///
/// The typed schema makes the API server reject it, so it never reaches a
/// list and cannot hold up other jobs.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_badly_typed_job_is_rejected_at_admission() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "kubemr-test-typed";
    fresh_namespace(&client, ns).await;

    let resource = ApiResource::erase::<MapReduceJob>(&());
    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), ns, &resource);
    let mut typo = DynamicObject::new("typo", &resource).within(ns);
    typo.data = serde_json::json!({
        "spec": { "image": "turbobytes/wordcount:1.0", "replicas": "two" }
    });

    let err = api
        .create(&PostParams::default(), &typo)
        .await
        .expect_err("admission should reject a string replica count");
    assert!(matches!(err, kube::Error::Api(ref e) if e.code == 422), "{err}");

    cleanup_namespace(&client, ns).await;
}
