//! Operator configuration from flags and environment

use std::path::Path;
use std::time::Duration;

use clap::Parser;

use kubemr_job::JobScope;

/// kubemr operator - moves MapReduceJobs from an empty status to Pending or Fail
#[derive(Parser, Debug, Clone)]
#[command(name = "kubemr-operator", version, about, long_about = None)]
pub struct OperatorArgs {
    /// Path to a kubeconfig; when absent or empty the in-cluster service
    /// account is used
    #[arg(long, env = "KUBEMR_KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Only manage jobs in this namespace (default: all namespaces)
    #[arg(long, env = "KUBEMR_NAMESPACE")]
    pub namespace: Option<String>,

    /// Seconds between the end of one tick and the start of the next
    #[arg(
        long,
        env = "KUBEMR_INTERVAL_SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Start a tick early when the watch sees a job awaiting validation
    #[arg(long, env = "KUBEMR_WATCH_TRIGGER")]
    pub watch_trigger: bool,

    /// Print the MapReduceJob CRD as YAML and exit
    #[arg(long)]
    pub crd: bool,
}

impl OperatorArgs {
    /// Kubeconfig path, treating an empty value as unset
    pub fn kubeconfig_path(&self) -> Option<&Path> {
        self.kubeconfig
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Path::new)
    }

    /// Which jobs to list, watch and patch
    pub fn scope(&self) -> JobScope {
        JobScope::from_namespace(self.namespace.as_deref())
    }

    /// Tick interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
