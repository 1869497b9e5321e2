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

use crate::infrastructure::constants::{
    CONTAINER_PORT, PORT_NAME_HTTP, PROTOCOL_TCP, WORKLOAD_REPLICAS,
};
use crate::infrastructure::kubernetes::resources::{resource_labels, selector_labels};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

/// Builds the Deployment that runs the workload's single container.
pub struct WorkloadBuilder {
    name: String,
    image: String,
}

impl WorkloadBuilder {
    pub fn new(name: String, image: String) -> Self {
        Self { name, image }
    }

    pub fn build(&self) -> Deployment {
        let container = Container {
            name: self.name.clone(),
            image: Some(self.image.clone()),
            ports: Some(vec![ContainerPort {
                name: Some(PORT_NAME_HTTP.to_string()),
                container_port: CONTAINER_PORT,
                protocol: Some(PROTOCOL_TCP.to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };

        Deployment {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(resource_labels(&self.name)),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(WORKLOAD_REPLICAS),
                selector: LabelSelector {
                    match_labels: Some(selector_labels(&self.name)),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(selector_labels(&self.name)),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![container],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
