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

use crate::domain::config::kubernetes::{GatewayConfig, RetryPolicy, RouteConfig};
use crate::domain::workload::exposer::RouteExposer;
use crate::domain::workload::intent::{validate_name, Intent};
use crate::domain::workload::outcome::{
    EndpointState, ExposeResult, ProvisionResult, RouteState, WorkloadState, WorkloadStatus,
};
use crate::domain::workload::provisioner::WorkloadProvisioner;
use crate::infrastructure::kubernetes::client::{ClusterGateway, KubeClusterGateway};
use crate::infrastructure::kubernetes::resources::{ResourceKind, ResourceSpec, ResourceSpecBuilder};
use crate::shared::error::{FailureCause, KubeError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Entry point wiring a gateway to both orchestrators.
pub struct WorkloadDescriptor {
    gateway: Arc<dyn ClusterGateway>,
    namespace: String,
    provisioner: WorkloadProvisioner,
    exposer: RouteExposer,
}

impl WorkloadDescriptor {
    pub async fn new_with_config(
        gateway_config: &GatewayConfig,
        retry: RetryPolicy,
        route: RouteConfig,
    ) -> Result<Self, KubeError> {
        retry.validate()?;
        route.validate()?;

        let gateway = KubeClusterGateway::new(gateway_config).await?;
        Ok(Self::with_gateway(
            Arc::new(gateway),
            gateway_config.namespace.clone(),
            retry,
            route,
        ))
    }

    pub fn with_gateway(
        gateway: Arc<dyn ClusterGateway>,
        namespace: String,
        retry: RetryPolicy,
        route: RouteConfig,
    ) -> Self {
        let builder = ResourceSpecBuilder::new(route);
        Self {
            provisioner: WorkloadProvisioner::new(gateway.clone(), builder.clone(), retry),
            exposer: RouteExposer::new(gateway.clone(), builder, retry),
            gateway,
            namespace,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn create_workload(
        &self,
        intent: &Intent,
        cancel: &CancellationToken,
    ) -> ProvisionResult {
        self.provisioner.provision(intent, cancel).await
    }

    pub async fn expose_workload(
        &self,
        name: &str,
        port: u32,
        cancel: &CancellationToken,
    ) -> ExposeResult {
        self.exposer.expose(name, port, cancel).await
    }

    /// Reads the three resources for `name` concurrently.
    pub async fn status(&self, name: &str) -> Result<WorkloadStatus, FailureCause> {
        validate_name(name)?;

        let (workload, endpoint, route) = futures::try_join!(
            self.gateway.get(ResourceKind::Workload, name),
            self.gateway.get(ResourceKind::Endpoint, name),
            self.gateway.get(ResourceKind::Route, name),
        )?;

        Ok(WorkloadStatus {
            name: name.to_string(),
            namespace: self.namespace.clone(),
            workload: workload.and_then(workload_state),
            endpoint: endpoint.and_then(endpoint_state),
            route: route.and_then(route_state),
        })
    }
}

fn workload_state(spec: ResourceSpec) -> Option<WorkloadState> {
    let ResourceSpec::Workload(deployment) = spec else {
        return None;
    };

    let image = deployment
        .spec
        .as_ref()
        .and_then(|s| s.template.spec.as_ref())
        .and_then(|p| p.containers.first())
        .and_then(|c| c.image.clone());
    let desired_replicas = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(0);
    let ready_replicas = deployment
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);

    Some(WorkloadState {
        image,
        desired_replicas: desired_replicas.max(0) as u32,
        ready_replicas: ready_replicas.max(0) as u32,
        created_at: deployment.metadata.creation_timestamp.map(|t| t.0),
    })
}

fn endpoint_state(spec: ResourceSpec) -> Option<EndpointState> {
    let ResourceSpec::Endpoint(service) = spec else {
        return None;
    };

    Some(EndpointState {
        cluster_ip: service.spec.and_then(|s| s.cluster_ip),
        created_at: service.metadata.creation_timestamp.map(|t| t.0),
    })
}

fn route_state(spec: ResourceSpec) -> Option<RouteState> {
    let ResourceSpec::Route(ingress) = spec else {
        return None;
    };

    let hosts = ingress
        .spec
        .and_then(|s| s.rules)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|rule| rule.host)
        .collect();

    Some(RouteState {
        hosts,
        created_at: ingress.metadata.creation_timestamp.map(|t| t.0),
    })
}
