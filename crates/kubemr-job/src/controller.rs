//! MapReduceJob reconciliation loop
//!
//! A fixed-interval poll over the full job list:
//! list → for each job: decide → patch → sleep → repeat.
//!
//! The loop keeps no state between ticks. A failed list abandons the tick; a
//! failed job stops the tick so the rest of the list is retried next time.
//! Nothing here is fatal: errors are logged and the loop carries on at the
//! same cadence forever.

use std::sync::Arc;
use std::time::Duration;

use kube::ResourceExt;
use tokio::sync::Notify;
use tracing::{debug, error, info, info_span, Instrument};

use kubemr_common::crd::{JobStatus, MapReduceJob};

use crate::client::JobClient;
use crate::error::JobError;
use crate::patch::{apply_patch, JobPatch};
use crate::policy::{decide, Transition};

/// Default delay between the end of one tick and the start of the next
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(15);

/// What processing one job did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Status already set, or already failed in the snapshot; no request sent
    Settled,
    /// Patched to `Pending`
    Pending,
    /// Patched to `Fail`
    Failed,
}

/// Per-tick counts, logged at the end of every tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub seen: usize,
    pub settled: usize,
    pub pending: usize,
    pub failed: usize,
}

impl TickReport {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Settled => self.settled += 1,
            JobOutcome::Pending => self.pending += 1,
            JobOutcome::Failed => self.failed += 1,
        }
    }
}

/// Shared context for the reconciliation loop
pub struct JobContext {
    pub client: Arc<dyn JobClient>,
    pub interval: Duration,
    /// Notified by the job watch to start the next tick early
    pub wake: Arc<Notify>,
}

impl JobContext {
    /// Create a context with the default 15s interval
    pub fn new(client: Arc<dyn JobClient>) -> Self {
        Self {
            client,
            interval: DEFAULT_TICK_INTERVAL,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Override the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    async fn wait_for_next_tick(&self) {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => {}
            _ = self.wake.notified() => debug!("woken early by job watch"),
        }
    }
}

/// Process a single job from this tick's snapshot.
///
/// Sends exactly the patch the policy chose for the job, if any.
pub async fn process(client: &dyn JobClient, job: &MapReduceJob) -> Result<JobOutcome, JobError> {
    let transition = decide(job);
    let Some(patch) = transition.patch() else {
        return Ok(JobOutcome::Settled);
    };

    if let Transition::MarkFailed { reason } = &transition {
        let outcome = mark_failed(client, job, &patch).await?;
        if outcome == JobOutcome::Failed {
            info!(
                job = %job.name_any(),
                namespace = ?job.namespace(),
                reason = %reason,
                "spec invalid, job failed"
            );
        }
        return Ok(outcome);
    }

    apply_patch(client, job, &patch).await?;
    info!(
        job = %job.name_any(),
        namespace = ?job.namespace(),
        "spec valid, job pending"
    );
    Ok(JobOutcome::Pending)
}

/// Send a failure patch, unless the snapshot already shows `Fail`.
///
/// The guard reads this tick's snapshot, not a fresh GET. Two replicas can
/// both pass it and send the same patch; the second write is a no-op in
/// effect.
pub async fn mark_failed(
    client: &dyn JobClient,
    job: &MapReduceJob,
    patch: &JobPatch,
) -> Result<JobOutcome, JobError> {
    if job.status == JobStatus::Fail {
        debug!(job = %job.name_any(), "job already failed");
        return Ok(JobOutcome::Settled);
    }

    apply_patch(client, job, patch).await?;
    Ok(JobOutcome::Failed)
}

/// One pass over the current job list, in list order.
///
/// Returns at the first job error; jobs after it wait for the next tick.
pub async fn run_tick(client: &dyn JobClient) -> Result<TickReport, JobError> {
    let jobs = client
        .list_jobs()
        .await
        .map_err(|source| JobError::List { source })?;

    let mut report = TickReport {
        seen: jobs.len(),
        ..Default::default()
    };

    for job in &jobs {
        let outcome = process(client, job).await?;
        report.record(outcome);
    }

    Ok(report)
}

/// Run ticks forever: the first immediately, then one per interval
pub async fn run_loop(ctx: Arc<JobContext>) {
    info!(interval = ?ctx.interval, "MapReduceJob loop starting");

    let mut tick: u64 = 0;
    loop {
        tick += 1;
        let span = info_span!("tick", tick);

        match run_tick(ctx.client.as_ref()).instrument(span).await {
            Ok(report) => info!(
                tick,
                jobs = report.seen,
                pending = report.pending,
                failed = report.failed,
                settled = report.settled,
                "tick complete"
            ),
            Err(e) => error!(
                tick,
                error = %e,
                retryable = e.is_retryable(),
                "tick aborted"
            ),
        }

        ctx.wait_for_next_tick().await;
    }
}
