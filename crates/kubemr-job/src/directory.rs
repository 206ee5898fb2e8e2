//! Watch stream over MapReduceJobs
//!
//! The poll loop is what guarantees convergence. The watch only logs changes
//! and, when enabled, wakes the loop early for a newly created job so users
//! don't wait a full interval for validation.

use std::sync::Arc;

use futures::StreamExt;
use kube::api::Api;
use kube::runtime::watcher::{self, Event};
use kube::runtime::WatchStreamExt;
use kube::ResourceExt;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use kubemr_common::crd::MapReduceJob;

/// Watcher timeout (seconds) - must be less than client read_timeout (30s)
/// so the API server closes idle watches before the client times out.
pub const WATCH_TIMEOUT_SECS: u32 = 25;

/// True when `event` shows a job the next tick would act on
pub fn needs_tick(event: &Event<MapReduceJob>) -> bool {
    match event {
        Event::Apply(job) | Event::InitApply(job) => job.status.is_empty(),
        Event::Delete(_) | Event::Init | Event::InitDone => false,
    }
}

/// Follow job changes until the stream ends.
///
/// Errors are logged and retried with kube's default backoff; they never
/// reach the poll loop. `wake` is notified for jobs still awaiting validation.
pub async fn watch_jobs(api: Api<MapReduceJob>, wake: Option<Arc<Notify>>) {
    let config = watcher::Config::default().timeout(WATCH_TIMEOUT_SECS);
    let mut stream = watcher::watcher(api, config).default_backoff().boxed();

    info!(early_wake = wake.is_some(), "watching MapReduceJobs");

    while let Some(event) = stream.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "job watch error, backing off");
                continue;
            }
        };

        match &event {
            Event::Apply(job) | Event::InitApply(job) => debug!(
                job = %job.name_any(),
                namespace = ?job.namespace(),
                status = %job.status,
                "job applied"
            ),
            Event::Delete(job) => debug!(
                job = %job.name_any(),
                namespace = ?job.namespace(),
                "job deleted"
            ),
            Event::Init | Event::InitDone => {}
        }

        if needs_tick(&event) {
            if let Some(wake) = &wake {
                wake.notify_one();
            }
        }
    }

    warn!("job watch stream ended");
}
