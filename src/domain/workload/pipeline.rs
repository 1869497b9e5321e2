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

//! Ordered resource steps and the machinery to commit or undo them

use crate::domain::config::kubernetes::RetryPolicy;
use crate::domain::workload::intent::Intent;
use crate::domain::workload::outcome::{Orphan, Rollback};
use crate::infrastructure::kubernetes::client::{ClusterGateway, CreateOutcome, DeleteOutcome};
use crate::infrastructure::kubernetes::resources::{ResourceKind, ResourceSpec, ResourceSpecBuilder};
use crate::shared::error::{GatewayError, ValidationError};
use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How a committed step is undone when a later step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensator {
    /// Delete the resource by kind and name.
    DeleteByName,
}

#[derive(Debug, Clone)]
pub struct Step {
    spec: ResourceSpec,
    compensator: Compensator,
}

impl Step {
    pub fn new(spec: ResourceSpec, compensator: Compensator) -> Self {
        Self { spec, compensator }
    }

    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    pub fn compensator(&self) -> Compensator {
        self.compensator
    }
}

/// Steps in commit order. Compensation walks them backwards.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Workload, then endpoint, then the route when the intent carries a port.
    pub fn plan(builder: &ResourceSpecBuilder, intent: &Intent) -> Result<Self, ValidationError> {
        let (workload, endpoint) = builder.build(intent)?;

        let mut pipeline = Self::new()
            .then(Step::new(
                ResourceSpec::Workload(workload),
                Compensator::DeleteByName,
            ))
            .then(Step::new(
                ResourceSpec::Endpoint(endpoint),
                Compensator::DeleteByName,
            ));

        if let Some(port) = intent.port() {
            let route = builder.build_route(intent.name(), u32::from(port))?;
            pipeline = pipeline.then(Step::new(
                ResourceSpec::Route(route),
                Compensator::DeleteByName,
            ));
        }

        Ok(pipeline)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Creates `spec`, retrying transient failures within `policy`.
pub(crate) async fn create_with_retry(
    gateway: &dyn ClusterGateway,
    spec: &ResourceSpec,
    policy: &RetryPolicy,
) -> Result<CreateOutcome, GatewayError> {
    let backoff = ExponentialBuilder::default()
        .with_min_delay(policy.min_delay)
        .with_max_delay(policy.max_delay)
        .with_max_times(policy.max_retries);

    let create = move || gateway.create(spec);

    create
        .retry(backoff)
        .when(GatewayError::is_transient)
        .notify(|err: &GatewayError, dur: Duration| {
            warn!(
                kind = %spec.kind(),
                name = %spec.name(),
                error = %err,
                delay = ?dur,
                "retrying create"
            );
        })
        .await
}

/// Deletes `targets` in the given order. Deletes are attempted once each;
/// failures are reported as orphans and never retried.
pub(crate) async fn compensate(
    gateway: Arc<dyn ClusterGateway>,
    targets: Vec<(ResourceKind, String)>,
) -> Rollback {
    if targets.is_empty() {
        return Rollback::NotAttempted;
    }

    let mut orphans = Vec::new();
    for (kind, name) in targets {
        match gateway.delete(kind, &name).await {
            Ok(DeleteOutcome::Deleted) => {
                info!(kind = %kind, name = %name, "compensating delete succeeded")
            }
            Ok(DeleteOutcome::NotFound) => {
                info!(kind = %kind, name = %name, "nothing to compensate, resource absent")
            }
            Err(error) => {
                warn!(
                    kind = %kind,
                    name = %name,
                    error = %error,
                    "compensating delete failed, resource orphaned"
                );
                orphans.push(Orphan { kind, name, error });
            }
        }
    }

    if orphans.is_empty() {
        Rollback::Performed
    } else {
        Rollback::Partial { orphans }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::kubernetes::memory::InMemoryGateway;

    #[test]
    fn test_plan_without_port() {
        let pipeline =
            Pipeline::plan(&ResourceSpecBuilder::default(), &Intent::new("web", "nginx")).unwrap();
        let kinds: Vec<_> = pipeline.steps().iter().map(Step::kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Workload, ResourceKind::Endpoint]);
        assert!(pipeline.steps().iter().all(|s| s.name() == "web"));
    }

    #[test]
    fn test_plan_with_port_appends_route() {
        let intent = Intent::new("web", "nginx").with_port(8080);
        let pipeline = Pipeline::plan(&ResourceSpecBuilder::default(), &intent).unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.steps()[2].kind(), ResourceKind::Route);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next_create(ResourceKind::Workload, GatewayError::transient("reset"));

        let pipeline =
            Pipeline::plan(&ResourceSpecBuilder::default(), &Intent::new("web", "nginx")).unwrap();
        let policy = RetryPolicy {
            max_retries: 2,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };

        let outcome = create_with_retry(&gateway, pipeline.steps()[0].spec(), &policy).await;
        assert_eq!(outcome, Ok(CreateOutcome::Created));
        assert_eq!(gateway.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next_create(ResourceKind::Workload, GatewayError::rejected("quota"));

        let pipeline =
            Pipeline::plan(&ResourceSpecBuilder::default(), &Intent::new("web", "nginx")).unwrap();
        let policy = RetryPolicy {
            max_retries: 3,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };

        let outcome = create_with_retry(&gateway, pipeline.steps()[0].spec(), &policy).await;
        assert_eq!(outcome, Err(GatewayError::rejected("quota")));
        assert_eq!(gateway.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_compensate_reports_orphans() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.fail_next_delete(ResourceKind::Workload, GatewayError::transient("timeout"));

        let rollback = compensate(
            gateway.clone(),
            vec![
                (ResourceKind::Endpoint, "web".to_string()),
                (ResourceKind::Workload, "web".to_string()),
            ],
        )
        .await;

        match rollback {
            Rollback::Partial { orphans } => {
                assert_eq!(orphans.len(), 1);
                assert_eq!(orphans[0].kind, ResourceKind::Workload);
            }
            other => panic!("expected partial rollback, got {:?}", other),
        }
        assert_eq!(gateway.delete_calls(), 2);
    }

    #[tokio::test]
    async fn test_compensate_nothing() {
        let gateway = Arc::new(InMemoryGateway::new());
        assert_eq!(compensate(gateway.clone(), Vec::new()).await, Rollback::NotAttempted);
        assert_eq!(gateway.total_calls(), 0);
    }
}
