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

use crate::domain::config::kubernetes::RetryPolicy;
use crate::domain::workload::intent::Intent;
use crate::domain::workload::outcome::{Orphan, ProvisionResult, ResourceRef, Rollback, Stage};
use crate::domain::workload::pipeline::{compensate, create_with_retry, Compensator, Pipeline, Step};
use crate::infrastructure::kubernetes::client::ClusterGateway;
use crate::infrastructure::kubernetes::resources::{ResourceKind, ResourceSpecBuilder};
use crate::shared::error::{FailureCause, GatewayError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Turns one intent into a consistent set of cluster resources, undoing
/// committed steps when a later one fails.
pub struct WorkloadProvisioner {
    gateway: Arc<dyn ClusterGateway>,
    builder: ResourceSpecBuilder,
    retry: RetryPolicy,
}

impl WorkloadProvisioner {
    pub fn new(
        gateway: Arc<dyn ClusterGateway>,
        builder: ResourceSpecBuilder,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            gateway,
            builder,
            retry,
        }
    }

    pub async fn provision(&self, intent: &Intent, cancel: &CancellationToken) -> ProvisionResult {
        let pipeline = match Pipeline::plan(&self.builder, intent) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                warn!(name = %intent.name(), error = %e, "rejecting invalid intent");
                return ProvisionResult::Failed {
                    stage: Stage::Validation,
                    cause: FailureCause::Validation(e),
                    rollback: Rollback::NotAttempted,
                };
            }
        };

        info!(
            name = %intent.name(),
            image = %intent.image(),
            steps = pipeline.len(),
            "provisioning workload"
        );

        let committed = match self.run(&pipeline, cancel).await {
            Ok(committed) => committed,
            Err(failed) => return failed,
        };

        let host = intent
            .port()
            .map(|port| self.builder.route_host(intent.name(), port));

        let mut workload = None;
        let mut endpoint = None;
        let mut route = None;
        for reference in committed {
            match reference.kind {
                ResourceKind::Workload => workload = Some(reference),
                ResourceKind::Endpoint => endpoint = Some(reference),
                ResourceKind::Route => route = Some(reference),
            }
        }

        match (workload, endpoint) {
            (Some(workload), Some(endpoint)) => {
                info!(name = %intent.name(), "workload provisioned");
                ProvisionResult::Provisioned {
                    workload,
                    endpoint,
                    route,
                    host,
                }
            }
            _ => unreachable!("a planned pipeline always commits a workload and an endpoint"),
        }
    }

    /// Walks the pipeline forward. On failure, compensates in reverse and
    /// returns the tagged failure.
    async fn run(
        &self,
        pipeline: &Pipeline,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResourceRef>, ProvisionResult> {
        let mut committed: Vec<&Step> = Vec::with_capacity(pipeline.len());
        let mut refs = Vec::with_capacity(pipeline.len());

        for step in pipeline.steps() {
            if cancel.is_cancelled() {
                return Err(self.fail(step, FailureCause::Cancelled, &committed, None).await);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FailureCause::Cancelled),
                result = create_with_retry(self.gateway.as_ref(), step.spec(), &self.retry) => {
                    result.map_err(FailureCause::Cluster)
                }
            };

            match result {
                Ok(outcome) => {
                    info!(
                        kind = %step.kind(),
                        name = %step.name(),
                        outcome = ?outcome,
                        "step committed"
                    );
                    committed.push(step);
                    refs.push(ResourceRef {
                        kind: step.kind(),
                        name: step.name().to_string(),
                        outcome,
                    });
                }
                Err(FailureCause::Cancelled) => {
                    // The interrupted create may have reached the server.
                    return Err(self
                        .fail(step, FailureCause::Cancelled, &committed, Some(step))
                        .await);
                }
                Err(cause) => return Err(self.fail(step, cause, &committed, None).await),
            }
        }

        Ok(refs)
    }

    async fn fail(
        &self,
        step: &Step,
        cause: FailureCause,
        committed: &[&Step],
        in_flight: Option<&Step>,
    ) -> ProvisionResult {
        let stage = Stage::from(step.kind());
        warn!(stage = %stage, name = %step.name(), cause = %cause, "provisioning failed");

        let targets: Vec<(ResourceKind, String)> = in_flight
            .into_iter()
            .chain(committed.iter().rev().copied())
            .map(|s| match s.compensator() {
                Compensator::DeleteByName => (s.kind(), s.name().to_string()),
            })
            .collect();

        let rollback = self.rollback(targets).await;
        if let Rollback::Partial { orphans } = &rollback {
            warn!(
                name = %step.name(),
                orphans = orphans.len(),
                "rollback incomplete, manual cleanup required"
            );
        }

        ProvisionResult::Failed {
            stage,
            cause,
            rollback,
        }
    }

    /// Compensation runs on its own task so it finishes even if the caller
    /// drops this future.
    async fn rollback(&self, targets: Vec<(ResourceKind, String)>) -> Rollback {
        if targets.is_empty() {
            return Rollback::NotAttempted;
        }

        let task = tokio::spawn(compensate(self.gateway.clone(), targets.clone()));
        match task.await {
            Ok(rollback) => rollback,
            Err(e) => Rollback::Partial {
                orphans: targets
                    .into_iter()
                    .map(|(kind, name)| Orphan {
                        kind,
                        name,
                        error: GatewayError::transient(format!("compensation task failed: {}", e)),
                    })
                    .collect(),
            },
        }
    }
}
