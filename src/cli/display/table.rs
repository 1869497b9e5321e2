//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::workload::{
    ExposeResult, ProvisionResult, ResourceRef, Rollback, WorkloadStatus,
};
use crate::infrastructure::kubernetes::client::CreateOutcome;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    fn resource_table() -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("KIND").set_alignment(CellAlignment::Left),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("RESULT").set_alignment(CellAlignment::Center),
            ]);
        table
    }

    fn resource_row(&self, table: &mut Table, resource: &ResourceRef) {
        let text = match resource.outcome {
            CreateOutcome::Created => "Created",
            CreateOutcome::AlreadyExists => "AlreadyExists",
        };
        table.add_row(vec![
            Cell::new(resource.kind.api_kind()),
            Cell::new(&resource.name),
            Cell::new(format!(
                "{} {}",
                StatusIcon::get_outcome_icon(resource.outcome),
                text
            ))
            .fg(self.theme.get_outcome_color(resource.outcome)),
        ]);
    }

    pub fn render_provision_result(&self, result: &ProvisionResult, namespace: &str) -> String {
        let mut output = String::new();

        match result {
            ProvisionResult::Provisioned {
                workload,
                endpoint,
                route,
                host,
            } => {
                output.push_str(&format!(
                    "{} Workload '{}' provisioned in namespace {}\n",
                    StatusIcon::SUCCESS.green(),
                    workload.name,
                    namespace
                ));

                let mut table = Self::resource_table();
                for resource in [Some(workload), Some(endpoint), route.as_ref()]
                    .into_iter()
                    .flatten()
                {
                    self.resource_row(&mut table, resource);
                }
                output.push_str(&table.to_string());
                output.push('\n');

                if let Some(host) = host {
                    output.push_str(&format!("Route: http://{}/\n", host.cyan()));
                }
            }
            ProvisionResult::Failed {
                stage,
                cause,
                rollback,
            } => {
                output.push_str(&format!(
                    "{} Provisioning failed at stage {}: {}\n",
                    StatusIcon::ERROR.red(),
                    stage.as_str().bold(),
                    cause
                ));
                output.push_str(&format!(
                    "Category: {}\n",
                    result
                        .category()
                        .map(|c| c.as_str())
                        .unwrap_or_default()
                ));
                output.push_str(&self.render_rollback(rollback));
            }
        }

        output
    }

    fn render_rollback(&self, rollback: &Rollback) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.add_row(vec![Cell::new(format!(
            "{} Rollback: {}",
            StatusIcon::get_rollback_icon(rollback),
            rollback.as_str()
        ))
        .fg(self.theme.get_rollback_color(rollback))]);

        if let Rollback::Partial { orphans } = rollback {
            for orphan in orphans {
                table.add_row(vec![Cell::new(format!(
                    "  orphaned {} '{}': {}",
                    orphan.kind.api_kind(),
                    orphan.name,
                    orphan.error
                ))
                .fg(self.theme.error)]);
            }
        }

        table.to_string()
    }

    pub fn render_expose_result(&self, result: &ExposeResult, namespace: &str) -> String {
        match result {
            ExposeResult::Exposed { route, host } => format!(
                "{} Route '{}' created in namespace {}\nRoute: http://{}/",
                StatusIcon::SUCCESS.green(),
                route,
                namespace,
                host.cyan()
            ),
            ExposeResult::AlreadyExposed { route, host } => format!(
                "{} Route '{}' already exists in namespace {}\nRoute: http://{}/",
                StatusIcon::REUSED.cyan(),
                route,
                namespace,
                host.cyan()
            ),
            ExposeResult::Failed { cause } => format!(
                "{} Expose failed: {}\nCategory: {}",
                StatusIcon::ERROR.red(),
                cause,
                cause.category().as_str()
            ),
        }
    }

    /// Render workload status as a single-column summary table
    pub fn render_workload_status(&self, status: &WorkloadStatus, now: DateTime<Utc>) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.add_row(vec![
            Cell::new(format!("Workload: {} | Namespace: {}", status.name, status.namespace))
                .set_alignment(CellAlignment::Left),
        ]);

        let workload_cell = match &status.workload {
            Some(state) => {
                let (ready, desired) = (state.ready_replicas, state.desired_replicas);
                let icon = StatusIcon::get_replica_icon(ready, desired);
                let text = StatusIcon::get_status_text(ready, desired);
                Cell::new(format!(
                    "Deployment\n  Image: {}\n  Replicas: {} {}/{} ({})\n  Age: {}",
                    state.image.as_deref().unwrap_or("<none>"),
                    icon,
                    ready,
                    desired,
                    text,
                    format_age(state.created_at, now)
                ))
                .fg(self.theme.get_replica_color(ready, desired))
            }
            None => Cell::new("Deployment\n  not found").fg(self.theme.muted),
        };

        let endpoint_cell = match &status.endpoint {
            Some(state) => Cell::new(format!(
                "Service\n  Cluster IP: {}\n  Age: {}",
                state.cluster_ip.as_deref().unwrap_or("<pending>"),
                format_age(state.created_at, now)
            ))
            .fg(self.theme.info),
            None => Cell::new("Service\n  not found").fg(self.theme.muted),
        };

        let route_cell = match &status.route {
            Some(state) => Cell::new(format!(
                "Ingress\n  Hosts: {}\n  Age: {}",
                state.hosts.join(", "),
                format_age(state.created_at, now)
            ))
            .fg(Color::Cyan),
            None => Cell::new("Ingress\n  not exposed").fg(self.theme.muted),
        };

        table.add_row(vec![workload_cell, endpoint_cell, route_cell]);

        table.to_string()
    }
}

/// Compact kubectl-style age, e.g. `45s`, `12m`, `3h`, `2d`.
pub fn format_age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "<unknown>".to_string();
    };

    let secs = (now - created_at).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workload::{Orphan, Stage, WorkloadState};
    use crate::infrastructure::kubernetes::resources::ResourceKind;
    use crate::shared::error::{FailureCause, GatewayError};
    use chrono::Duration;

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(None, now), "<unknown>");
        assert_eq!(format_age(Some(now - Duration::seconds(42)), now), "42s");
        assert_eq!(format_age(Some(now - Duration::minutes(5)), now), "5m");
        assert_eq!(format_age(Some(now - Duration::hours(7)), now), "7h");
        assert_eq!(format_age(Some(now - Duration::days(3)), now), "3d");
        assert_eq!(format_age(Some(now + Duration::seconds(10)), now), "0s");
    }

    #[test]
    fn test_render_provisioned() {
        let renderer = TableRenderer::new();
        let result = ProvisionResult::Provisioned {
            workload: ResourceRef {
                kind: ResourceKind::Workload,
                name: "web".to_string(),
                outcome: CreateOutcome::Created,
            },
            endpoint: ResourceRef {
                kind: ResourceKind::Endpoint,
                name: "web".to_string(),
                outcome: CreateOutcome::AlreadyExists,
            },
            route: None,
            host: None,
        };

        let output = renderer.render_provision_result(&result, "default");
        assert!(output.contains("Deployment"));
        assert!(output.contains("Service"));
        assert!(output.contains("AlreadyExists"));
        assert!(!output.contains("Ingress"));
    }

    #[test]
    fn test_render_partial_rollback() {
        let renderer = TableRenderer::new();
        let result = ProvisionResult::Failed {
            stage: Stage::Endpoint,
            cause: FailureCause::Cluster(GatewayError::rejected("invalid service")),
            rollback: Rollback::Partial {
                orphans: vec![Orphan {
                    kind: ResourceKind::Workload,
                    name: "web".to_string(),
                    error: GatewayError::transient("timed out"),
                }],
            },
        };

        let output = renderer.render_provision_result(&result, "default");
        assert!(output.contains("endpoint"));
        assert!(output.contains("PartialProvisioning"));
        assert!(output.contains("orphaned Deployment 'web'"));
    }

    #[test]
    fn test_render_missing_route() {
        let renderer = TableRenderer::new();
        let status = WorkloadStatus {
            name: "web".to_string(),
            namespace: "apps".to_string(),
            workload: Some(WorkloadState {
                image: Some("nginx".to_string()),
                desired_replicas: 1,
                ready_replicas: 1,
                created_at: None,
            }),
            endpoint: None,
            route: None,
        };

        let output = renderer.render_workload_status(&status, Utc::now());
        assert!(output.contains("nginx"));
        assert!(output.contains("1/1"));
        assert!(output.contains("not exposed"));
    }
}
