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

use crate::infrastructure::constants::{ENDPOINT_PORT, PROTOCOL_TCP, SERVICE_TYPE_CLUSTER_IP};
use crate::infrastructure::kubernetes::resources::{resource_labels, selector_labels};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Builds the ClusterIP Service fronting a workload's pods on port 80.
pub struct EndpointBuilder {
    name: String,
}

impl EndpointBuilder {
    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn build(&self) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(resource_labels(&self.name)),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some(SERVICE_TYPE_CLUSTER_IP.to_string()),
                ports: Some(vec![self.create_service_port()]),
                selector: Some(selector_labels(&self.name)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn create_service_port(&self) -> ServicePort {
        ServicePort {
            port: ENDPOINT_PORT,
            target_port: Some(IntOrString::Int(ENDPOINT_PORT)),
            protocol: Some(PROTOCOL_TCP.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_shape() {
        let service = EndpointBuilder::new("web".to_string()).build();
        let spec = service.spec.as_ref().unwrap();

        assert_eq!(service.metadata.name.as_deref(), Some("web"));
        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));

        let selector = spec.selector.as_ref().unwrap();
        assert_eq!(selector.len(), 1);
        assert_eq!(selector.get("app").map(String::as_str), Some("web"));

        let ports = spec.ports.as_ref().unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 80);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(80)));
        assert_eq!(ports[0].protocol.as_deref(), Some("TCP"));
    }
}
