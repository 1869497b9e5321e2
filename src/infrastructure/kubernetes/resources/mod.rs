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

//! Resource specifications derived from an intent

pub mod deployment;
pub mod ingress;
pub mod service;

pub use self::deployment::WorkloadBuilder;
pub use self::ingress::{route_host, RouteBuilder};
pub use self::service::EndpointBuilder;

use crate::domain::config::kubernetes::RouteConfig;
use crate::domain::workload::intent::{validate_name, validate_port, Intent};
use crate::infrastructure::constants::{
    DNS_LABEL_MAX_LEN, LABEL_APP, LABEL_MANAGED_BY, MANAGED_BY_VALUE,
};
use crate::shared::error::ValidationError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub type WorkloadSpec = Deployment;
pub type EndpointSpec = Service;
pub type RouteSpec = Ingress;

/// The resource kinds a workload is made of, in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Workload,
    Endpoint,
    Route,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Workload, Self::Endpoint, Self::Route];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workload => "workload",
            Self::Endpoint => "endpoint",
            Self::Route => "route",
        }
    }

    /// Kubernetes object kind backing this resource.
    pub fn api_kind(&self) -> &'static str {
        match self {
            Self::Workload => "Deployment",
            Self::Endpoint => "Service",
            Self::Route => "Ingress",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceSpec {
    Workload(WorkloadSpec),
    Endpoint(EndpointSpec),
    Route(RouteSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Workload(_) => ResourceKind::Workload,
            Self::Endpoint(_) => ResourceKind::Endpoint,
            Self::Route(_) => ResourceKind::Route,
        }
    }

    pub fn name(&self) -> &str {
        let name = match self {
            Self::Workload(d) => d.metadata.name.as_deref(),
            Self::Endpoint(s) => s.metadata.name.as_deref(),
            Self::Route(i) => i.metadata.name.as_deref(),
        };
        name.unwrap_or_default()
    }
}

/// Selector shared by the workload's pods and its endpoint.
pub fn selector_labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_APP.to_string(), name.to_string());
    labels
}

/// Object metadata labels for every derived resource.
pub fn resource_labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = selector_labels(name);
    labels.insert(LABEL_MANAGED_BY.to_string(), MANAGED_BY_VALUE.to_string());
    labels
}

/// Derives all resource specifications for a workload.
///
/// Pure: no I/O, and the only failures are input validation errors.
#[derive(Debug, Clone, Default)]
pub struct ResourceSpecBuilder {
    route: RouteConfig,
}

impl ResourceSpecBuilder {
    pub fn new(route: RouteConfig) -> Self {
        Self { route }
    }

    pub fn build(&self, intent: &Intent) -> Result<(WorkloadSpec, EndpointSpec), ValidationError> {
        intent.validate()?;

        let workload =
            WorkloadBuilder::new(intent.name().to_string(), intent.image().to_string()).build();
        let endpoint = EndpointBuilder::new(intent.name().to_string()).build();

        Ok((workload, endpoint))
    }

    pub fn build_route(&self, name: &str, port: u32) -> Result<RouteSpec, ValidationError> {
        self.build_route_with_host(name, port).map(|(route, _)| route)
    }

    /// Like [`Self::build_route`], also returning the external host.
    ///
    /// `<name>-<port>` becomes the first DNS label of the host, so it is held
    /// to the same 63 character limit as the name itself.
    pub fn build_route_with_host(
        &self,
        name: &str,
        port: u32,
    ) -> Result<(RouteSpec, String), ValidationError> {
        validate_name(name)?;
        let port = validate_port(port)?;

        let host_label_len = name.len() + 1 + port.to_string().len();
        if host_label_len > DNS_LABEL_MAX_LEN {
            return Err(ValidationError::invalid_identifier(
                name,
                format!(
                    "'{}-{}' exceeds {} characters as a host label",
                    name, port, DNS_LABEL_MAX_LEN
                ),
            ));
        }

        let builder = RouteBuilder::new(name.to_string(), port, self.route.clone());
        Ok((builder.build(), builder.host()))
    }

    pub fn route_host(&self, name: &str, port: u16) -> String {
        route_host(name, port, &self.route.domain_suffix)
    }
}
