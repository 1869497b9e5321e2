// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured results returned by the orchestrators

use crate::infrastructure::kubernetes::client::CreateOutcome;
use crate::infrastructure::kubernetes::resources::ResourceKind;
use crate::shared::error::{ErrorCategory, FailureCause, GatewayError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Where in an orchestration a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Workload,
    Endpoint,
    Route,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Workload => "workload",
            Self::Endpoint => "endpoint",
            Self::Route => "route",
        }
    }
}

impl From<ResourceKind> for Stage {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Workload => Self::Workload,
            ResourceKind::Endpoint => Self::Endpoint,
            ResourceKind::Route => Self::Route,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource committed by a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub outcome: CreateOutcome,
}

/// A resource left behind because its compensating delete failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Orphan {
    pub kind: ResourceKind,
    pub name: String,
    pub error: GatewayError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Rollback {
    /// Every committed resource was removed again.
    Performed,
    /// At least one compensating delete failed; the orphans need manual cleanup.
    Partial { orphans: Vec<Orphan> },
    /// Nothing had been committed, so there was nothing to undo.
    NotAttempted,
}

impl Rollback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performed => "performed",
            Self::Partial { .. } => "partial",
            Self::NotAttempted => "not-attempted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionResult {
    Provisioned {
        workload: ResourceRef,
        endpoint: ResourceRef,
        route: Option<ResourceRef>,
        host: Option<String>,
    },
    Failed {
        stage: Stage,
        cause: FailureCause,
        rollback: Rollback,
    },
}

impl ProvisionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Provisioned { .. })
    }

    /// Failure category, or `ConflictButSatisfied` when a success reused
    /// resources that already existed.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Failed {
                rollback: Rollback::Partial { .. },
                ..
            } => Some(ErrorCategory::PartialProvisioning),
            Self::Failed { cause, .. } => Some(cause.category()),
            Self::Provisioned {
                workload,
                endpoint,
                route,
                ..
            } => {
                let reused = [Some(workload), Some(endpoint), route.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|r| r.outcome == CreateOutcome::AlreadyExists);
                reused.then_some(ErrorCategory::ConflictButSatisfied)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExposeResult {
    Exposed { route: String, host: String },
    /// The route was already present; exposing is idempotent.
    AlreadyExposed { route: String, host: String },
    Failed { cause: FailureCause },
}

impl ExposeResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Exposed { .. } => None,
            Self::AlreadyExposed { .. } => Some(ErrorCategory::ConflictButSatisfied),
            Self::Failed { cause } => Some(cause.category()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadState {
    pub image: Option<String>,
    pub desired_replicas: u32,
    pub ready_replicas: u32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointState {
    pub cluster_ip: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteState {
    pub hosts: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Snapshot of the resources that exist for a workload name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadStatus {
    pub name: String,
    pub namespace: String,
    pub workload: Option<WorkloadState>,
    pub endpoint: Option<EndpointState>,
    pub route: Option<RouteState>,
}

impl WorkloadStatus {
    pub fn is_complete(&self) -> bool {
        self.workload.is_some() && self.endpoint.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(kind: ResourceKind) -> ResourceRef {
        ResourceRef {
            kind,
            name: "web".to_string(),
            outcome: CreateOutcome::Created,
        }
    }

    #[test]
    fn test_partial_rollback_category() {
        let result = ProvisionResult::Failed {
            stage: Stage::Endpoint,
            cause: FailureCause::Cluster(GatewayError::rejected("invalid")),
            rollback: Rollback::Partial {
                orphans: vec![Orphan {
                    kind: ResourceKind::Workload,
                    name: "web".to_string(),
                    error: GatewayError::transient("timeout"),
                }],
            },
        };
        assert_eq!(result.category(), Some(ErrorCategory::PartialProvisioning));
        assert!(!result.is_success());
    }

    #[test]
    fn test_reused_resources_category() {
        let mut endpoint = created(ResourceKind::Endpoint);
        let result = ProvisionResult::Provisioned {
            workload: created(ResourceKind::Workload),
            endpoint: endpoint.clone(),
            route: None,
            host: None,
        };
        assert_eq!(result.category(), None);

        endpoint.outcome = CreateOutcome::AlreadyExists;
        let result = ProvisionResult::Provisioned {
            workload: created(ResourceKind::Workload),
            endpoint,
            route: None,
            host: None,
        };
        assert_eq!(result.category(), Some(ErrorCategory::ConflictButSatisfied));
    }

    #[test]
    fn test_result_serializes_tagged() {
        let result = ProvisionResult::Failed {
            stage: Stage::Validation,
            cause: FailureCause::Validation(crate::shared::error::ValidationError::InvalidPort {
                port: 0,
            }),
            rollback: Rollback::NotAttempted,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "validation");
        assert_eq!(json["rollback"]["outcome"], "not_attempted");
        assert_eq!(json["cause"]["kind"], "validation");
    }
}
