// CLI command definitions

use super::k8s::{CreateCommand, ExposeCommand, StatusCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "workload-kube",
    version,
    about = "Provision and expose single-image workloads on Kubernetes",
    long_about = "Creates a Deployment and a ClusterIP Service for an image under one name, and optionally routes an external host to it through an Ingress"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create a workload and its internal endpoint (and a route when --port is given)
    Create(CreateCommand),

    /// Route an external host to an existing workload's endpoint
    Expose(ExposeCommand),

    /// Show which resources exist for a workload
    Status(StatusCommand),
}
