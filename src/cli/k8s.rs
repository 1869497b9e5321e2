//! Workload commands

use crate::domain::config::{apply_to_launch_conf, LaunchConf};
use crate::domain::workload::intent::validate_port;
use crate::domain::workload::{
    ExposeResult, Intent, Pipeline, ProvisionResult, Rollback, Stage, WorkloadDescriptor,
};
use crate::infrastructure::constants::CONF_FILE_ENV;
use crate::infrastructure::kubernetes::resources::{ResourceSpec, ResourceSpecBuilder};
use crate::shared::error::FailureCause;
use clap::{Args, Parser, ValueEnum};
use serde::Serialize;
use std::collections::HashMap;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Options shared by every command for reaching the cluster.
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// Kubernetes namespace (overrides the configuration file)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Path to kubeconfig file
    /// If not specified, uses default kubeconfig resolution (KUBECONFIG env or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Path to workload-kube configuration file (TOML)
    /// Falls back to the WORKLOAD_KUBE_CONF environment variable, then built-in defaults
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Dynamic configuration properties (-D key=value)
    ///
    /// Cluster: kubernetes.namespace, kubernetes.config.file, kubernetes.context, kubernetes.call-timeout-secs
    /// Retry: retry.max-retries, retry.min-delay-ms, retry.max-delay-ms
    /// Route: route.domain-suffix, route.ingress-class
    ///
    /// Example: -Droute.domain-suffix=apps.example.com -Dretry.max-retries=3
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value = "table")]
    pub output: OutputFormat,
}

impl ClusterArgs {
    /// Priority: command line > -D properties > config file > defaults
    pub fn resolve(&self) -> anyhow::Result<LaunchConf> {
        let mut conf = if let Some(ref path) = self.config_file {
            LaunchConf::from(path)?
        } else if let Ok(env_path) = std::env::var(CONF_FILE_ENV) {
            LaunchConf::from(&env_path)?
        } else {
            LaunchConf::default()
        };

        if !self.properties.is_empty() {
            let configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_launch_conf(&configs, &mut conf);
        }

        if let Some(ref namespace) = self.namespace {
            conf.kubernetes.namespace = namespace.clone();
        }
        if let Some(ref kubeconfig) = self.kubeconfig {
            conf.kubernetes.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(ref context) = self.context {
            conf.kubernetes.context = Some(context.clone());
        }

        Ok(conf)
    }

    async fn descriptor(&self, conf: &LaunchConf) -> anyhow::Result<WorkloadDescriptor> {
        WorkloadDescriptor::new_with_config(
            &conf.gateway_config(),
            conf.retry_policy(),
            conf.route_config(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to cluster: {}", e))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    /// Workload name (DNS label: lowercase alphanumerics and '-', at most 63 chars)
    pub name: String,

    /// Container image reference
    pub image: String,

    /// Also route <name>-<port>.<domain-suffix> to the workload
    #[arg(long)]
    pub port: Option<u32>,

    /// Print the planned manifests without contacting the cluster
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub cluster: ClusterArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ExposeCommand {
    /// Name of an existing workload
    pub name: String,

    /// Port encoded into the external host name
    pub port: u32,

    #[command(flatten)]
    pub cluster: ClusterArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    /// Workload name
    pub name: String,

    #[command(flatten)]
    pub cluster: ClusterArgs,
}

impl CreateCommand {
    pub async fn execute(&self, cancel: &CancellationToken) -> anyhow::Result<ExitCode> {
        let conf = self.cluster.resolve()?;
        let output = self.cluster.output;

        let intent = match self.intent() {
            Ok(intent) => intent,
            Err(failed) => {
                print_result(output, &failed, |r| {
                    render().render_provision_result(r, &conf.kubernetes.namespace)
                })?;
                return Ok(ExitCode::FAILURE);
            }
        };

        if self.dry_run {
            return self.print_plan(&conf, &intent);
        }

        let descriptor = self.cluster.descriptor(&conf).await?;
        let result = descriptor.create_workload(&intent, cancel).await;

        print_result(output, &result, |r| {
            render().render_provision_result(r, descriptor.namespace())
        })?;

        Ok(exit_code(result.is_success()))
    }

    /// Out-of-range ports are reported like any other validation failure.
    fn intent(&self) -> Result<Intent, ProvisionResult> {
        let intent = Intent::new(self.name.clone(), self.image.clone());
        match self.port.map(validate_port).transpose() {
            Ok(Some(port)) => Ok(intent.with_port(port)),
            Ok(None) => Ok(intent),
            Err(e) => Err(ProvisionResult::Failed {
                stage: Stage::Validation,
                cause: FailureCause::Validation(e),
                rollback: Rollback::NotAttempted,
            }),
        }
    }

    fn print_plan(&self, conf: &LaunchConf, intent: &Intent) -> anyhow::Result<ExitCode> {
        let route = conf.route_config();
        route.validate()?;
        let builder = ResourceSpecBuilder::new(route);
        let pipeline = match Pipeline::plan(&builder, intent) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                let failed = ProvisionResult::Failed {
                    stage: Stage::Validation,
                    cause: FailureCause::Validation(e),
                    rollback: Rollback::NotAttempted,
                };
                print_result(self.cluster.output, &failed, |r| {
                    render().render_provision_result(r, &conf.kubernetes.namespace)
                })?;
                return Ok(ExitCode::FAILURE);
            }
        };

        info!(name = %intent.name(), steps = pipeline.len(), "dry run, not contacting cluster");

        let specs: Vec<&ResourceSpec> = pipeline.steps().iter().map(|s| s.spec()).collect();
        match self.cluster.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&specs)?),
            OutputFormat::Yaml | OutputFormat::Table => {
                let documents = specs
                    .iter()
                    .map(serde_yaml::to_string)
                    .collect::<Result<Vec<_>, _>>()?;
                print!("{}", documents.join("---\n"));
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

impl ExposeCommand {
    pub async fn execute(&self, cancel: &CancellationToken) -> anyhow::Result<ExitCode> {
        let conf = self.cluster.resolve()?;
        let descriptor = self.cluster.descriptor(&conf).await?;

        let result = descriptor
            .expose_workload(&self.name, self.port, cancel)
            .await;

        print_result(self.cluster.output, &result, |r: &ExposeResult| {
            render().render_expose_result(r, descriptor.namespace())
        })?;

        Ok(exit_code(result.is_success()))
    }
}

impl StatusCommand {
    pub async fn execute(&self) -> anyhow::Result<ExitCode> {
        let conf = self.cluster.resolve()?;
        let descriptor = self.cluster.descriptor(&conf).await?;

        let status = descriptor
            .status(&self.name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get workload status: {}", e))?;

        print_result(self.cluster.output, &status, |s| {
            render().render_workload_status(s, chrono::Utc::now())
        })?;

        Ok(exit_code(status.is_complete()))
    }
}

fn render() -> crate::cli::display::TableRenderer {
    crate::cli::display::TableRenderer::new()
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_result<T, F>(format: OutputFormat, value: &T, table: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Table => println!("{}", table(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Parse dynamic configuration properties from -D key=value format
fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();

    for config in configs {
        let parts: Vec<&str> = config.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ));
        }

        let key = parts[0].trim();
        let value = parts[1].trim();

        if key.is_empty() {
            return Err(format!("Empty key in config: '{}'", config));
        }

        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_args(properties: &[&str]) -> ClusterArgs {
        ClusterArgs {
            namespace: None,
            kubeconfig: None,
            context: None,
            config_file: None,
            properties: properties.iter().map(|p| p.to_string()).collect(),
            output: OutputFormat::Table,
        }
    }

    #[test]
    fn test_parse_dynamic_configs() {
        let map = parse_dynamic_configs(&["a.b=1".to_string(), "c = x=y".to_string()]).unwrap();
        assert_eq!(map.get("a.b").map(String::as_str), Some("1"));
        assert_eq!(map.get("c").map(String::as_str), Some("x=y"));

        assert!(parse_dynamic_configs(&["novalue".to_string()]).is_err());
        assert!(parse_dynamic_configs(&["=1".to_string()]).is_err());
    }

    #[test]
    fn test_flags_override_properties() {
        let mut args = cluster_args(&["kubernetes.namespace=from-prop"]);
        args.namespace = Some("from-flag".to_string());

        let conf = args.resolve().unwrap();
        assert_eq!(conf.kubernetes.namespace, "from-flag");
    }

    #[test]
    fn test_dry_run_rejects_bad_domain_suffix() {
        let cmd = CreateCommand {
            name: "web".to_string(),
            image: "nginx".to_string(),
            port: Some(80),
            dry_run: true,
            cluster: cluster_args(&["route.domain-suffix=.bad"]),
        };

        let conf = cmd.cluster.resolve().unwrap();
        let intent = cmd.intent().unwrap();
        let err = cmd.print_plan(&conf, &intent).unwrap_err();
        assert!(err.to_string().contains("Invalid domain suffix"));
    }

    #[test]
    fn test_out_of_range_port_is_validation_failure() {
        let cmd = CreateCommand {
            name: "web".to_string(),
            image: "nginx".to_string(),
            port: Some(70000),
            dry_run: true,
            cluster: cluster_args(&[]),
        };

        match cmd.intent() {
            Err(ProvisionResult::Failed { stage, .. }) => assert_eq!(stage, Stage::Validation),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
