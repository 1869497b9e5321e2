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

use crate::domain::config::kubernetes::GatewayConfig;
use crate::infrastructure::kubernetes::resources::{ResourceKind, ResourceSpec};
use crate::shared::error::{GatewayError, KubeError};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Non-failing outcome of a create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateOutcome {
    Created,
    /// An object with the same name was already present.
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// The only path from this crate to the control plane.
///
/// Implementations classify every remote outcome and never retry.
#[async_trait::async_trait]
pub trait ClusterGateway: Send + Sync {
    async fn create(&self, spec: &ResourceSpec) -> Result<CreateOutcome, GatewayError>;

    /// `Ok(None)` when no object of that kind and name exists.
    async fn get(&self, kind: ResourceKind, name: &str)
        -> Result<Option<ResourceSpec>, GatewayError>;

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<DeleteOutcome, GatewayError>;
}

/// Gateway backed by the Kubernetes API server.
pub struct KubeClusterGateway {
    client: Client,
    namespace: String,
    call_timeout: Duration,
}

impl KubeClusterGateway {
    pub async fn new(config: &GatewayConfig) -> Result<Self, KubeError> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        config.validate()?;

        let kubeconfig = if let Some(path) = &config.kubeconfig {
            Kubeconfig::read_from(path)
                .map_err(|e| KubeError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        } else {
            Kubeconfig::read()
                .map_err(|e| KubeError::KubeError(format!("Failed to load kubeconfig: {}", e)))?
        };

        let config_options = KubeConfigOptions {
            context: config.context.clone(),
            cluster: None,
            user: None,
        };

        let mut kube_config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                KubeError::KubeError(format!("Failed to create Kubernetes config: {}", e))
            })?;
        kube_config.connect_timeout = Some(config.call_timeout);
        kube_config.read_timeout = Some(config.call_timeout);

        let client = Client::try_from(kube_config).map_err(|e| {
            KubeError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self::with_client(client, config))
    }

    /// Wraps an already constructed client.
    pub fn with_client(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            namespace: config.namespace.clone(),
            call_timeout: config.call_timeout,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn create_object<K>(&self, obj: &K) -> Result<CreateOutcome, GatewayError>
    where
        K: kube::Resource<Scope = NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        let pp = PostParams::default();

        match bounded(self.call_timeout, api.create(&pp, obj)).await {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(RemoteFailure::AlreadyExists) => Ok(CreateOutcome::AlreadyExists),
            Err(RemoteFailure::NotFound) => Err(GatewayError::rejected(
                "create returned not found; namespace may not exist"
            )),
            Err(RemoteFailure::Other(e)) => Err(e),
        }
    }

    async fn get_object<K>(&self, name: &str) -> Result<Option<K>, GatewayError>
    where
        K: kube::Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();

        match bounded(self.call_timeout, api.get(name)).await {
            Ok(obj) => Ok(Some(obj)),
            Err(RemoteFailure::NotFound) => Ok(None),
            Err(RemoteFailure::AlreadyExists) => {
                Err(GatewayError::rejected("unexpected conflict on read"))
            }
            Err(RemoteFailure::Other(e)) => Err(e),
        }
    }

    async fn delete_object<K>(&self, name: &str) -> Result<DeleteOutcome, GatewayError>
    where
        K: kube::Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        let dp = DeleteParams::background();

        match bounded(self.call_timeout, api.delete(name, &dp)).await {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(RemoteFailure::NotFound) => Ok(DeleteOutcome::NotFound),
            Err(RemoteFailure::AlreadyExists) => {
                Err(GatewayError::transient("conflict while deleting"))
            }
            Err(RemoteFailure::Other(e)) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl ClusterGateway for KubeClusterGateway {
    async fn create(&self, spec: &ResourceSpec) -> Result<CreateOutcome, GatewayError> {
        debug!(
            kind = %spec.kind(),
            name = %spec.name(),
            namespace = %self.namespace,
            "creating resource"
        );

        let result = match spec {
            ResourceSpec::Workload(d) => self.create_object::<Deployment>(d).await,
            ResourceSpec::Endpoint(s) => self.create_object::<Service>(s).await,
            ResourceSpec::Route(i) => self.create_object::<Ingress>(i).await,
        };

        match &result {
            Ok(outcome) => {
                info!(
                    kind = %spec.kind(),
                    name = %spec.name(),
                    outcome = ?outcome,
                    "create finished"
                )
            }
            Err(e) => warn!(kind = %spec.kind(), name = %spec.name(), error = %e, "create failed"),
        }
        result
    }

    async fn get(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<ResourceSpec>, GatewayError> {
        debug!(kind = %kind, name = %name, namespace = %self.namespace, "reading resource");

        match kind {
            ResourceKind::Workload => Ok(self
                .get_object::<Deployment>(name)
                .await?
                .map(ResourceSpec::Workload)),
            ResourceKind::Endpoint => Ok(self
                .get_object::<Service>(name)
                .await?
                .map(ResourceSpec::Endpoint)),
            ResourceKind::Route => Ok(self
                .get_object::<Ingress>(name)
                .await?
                .map(ResourceSpec::Route)),
        }
    }

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<DeleteOutcome, GatewayError> {
        debug!(kind = %kind, name = %name, namespace = %self.namespace, "deleting resource");

        let result = match kind {
            ResourceKind::Workload => self.delete_object::<Deployment>(name).await,
            ResourceKind::Endpoint => self.delete_object::<Service>(name).await,
            ResourceKind::Route => self.delete_object::<Ingress>(name).await,
        };

        match &result {
            Ok(outcome) => info!(kind = %kind, name = %name, outcome = ?outcome, "delete finished"),
            Err(e) => warn!(kind = %kind, name = %name, error = %e, "delete failed"),
        }
        result
    }
}

/// Runs one remote call under `limit`. An elapsed timer is transient.
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, RemoteFailure>
where
    F: Future<Output = Result<T, kube::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(classify(err)),
        Err(_) => Err(RemoteFailure::Other(GatewayError::transient(format!(
            "call timed out after {:?}",
            limit
        )))),
    }
}

/// A kube error reduced to what the gateway callers care about.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RemoteFailure {
    AlreadyExists,
    NotFound,
    Other(GatewayError),
}

fn classify(err: kube::Error) -> RemoteFailure {
    match err {
        kube::Error::Api(ae) => classify_status(ae.code, &ae.reason, &ae.message),
        kube::Error::HyperError(e) => RemoteFailure::Other(GatewayError::transient(e.to_string())),
        kube::Error::Service(e) => RemoteFailure::Other(GatewayError::transient(e.to_string())),
        other => RemoteFailure::Other(GatewayError::rejected(other.to_string())),
    }
}

fn classify_status(code: u16, reason: &str, message: &str) -> RemoteFailure {
    match code {
        409 => RemoteFailure::AlreadyExists,
        404 => RemoteFailure::NotFound,
        408 | 429 | 500 | 502 | 503 | 504 => RemoteFailure::Other(GatewayError::transient(
            format!("{} ({}): {}", reason, code, message),
        )),
        _ => RemoteFailure::Other(GatewayError::rejected(format!(
            "{} ({}): {}",
            reason, code, message
        ))),
    }
}
