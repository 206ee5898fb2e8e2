//! kubemr operator - validates MapReduceJobs and marks them Pending or Fail

use std::sync::Arc;

use clap::Parser;

use kubemr_common::crd::job_crd_yaml;
use kubemr_common::kube_utils::create_client;
use kubemr_common::telemetry::{init_telemetry, TelemetryConfig};
use kubemr_job::directory::watch_jobs;
use kubemr_job::{run_loop, JobClientImpl, JobContext};
use kubemr_operator::config::OperatorArgs;
use kubemr_operator::startup::{
    ensure_job_crd, wait_for_job_crd, CrdClientImpl, CrdOutcome, CRD_ESTABLISHED_TIMEOUT,
};

#[tokio::main]
async fn main() {
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    let args = OperatorArgs::parse();

    if args.crd {
        match job_crd_yaml() {
            Ok(yaml) => {
                println!("{yaml}");
                return;
            }
            Err(e) => {
                eprintln!("failed to serialize CRD: {e}");
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = init_telemetry(TelemetryConfig::default()) {
        eprintln!("failed to initialize telemetry: {e}");
        std::process::exit(1);
    }

    // run() only returns on a startup failure; the loop itself never ends
    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "fatal startup error");
        std::process::exit(1);
    }
}

async fn run(args: OperatorArgs) -> anyhow::Result<()> {
    let client = create_client(args.kubeconfig_path()).await?;
    tracing::info!(
        kubeconfig = ?args.kubeconfig_path(),
        namespace = ?args.namespace,
        "connected to cluster"
    );

    let crds = CrdClientImpl::new(client.clone());
    if ensure_job_crd(&crds).await? == CrdOutcome::Created {
        wait_for_job_crd(&crds, CRD_ESTABLISHED_TIMEOUT).await;
    }

    let scope = args.scope();
    let jobs = JobClientImpl::new(client.clone(), scope.clone());
    let ctx = Arc::new(JobContext::new(Arc::new(jobs)).with_interval(args.interval()));

    let wake = args.watch_trigger.then(|| ctx.wake.clone());
    tokio::spawn(watch_jobs(scope.api(client), wake));

    let loop_ctx = ctx.clone();
    tokio::select! {
        _ = run_loop(loop_ctx) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown signal received"),
    }

    Ok(())
}
