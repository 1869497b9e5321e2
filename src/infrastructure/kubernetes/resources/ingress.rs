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

use crate::domain::config::kubernetes::RouteConfig;
use crate::infrastructure::constants::{ENDPOINT_PORT, PATH_TYPE_PREFIX, ROUTE_PATH};
use crate::infrastructure::kubernetes::resources::resource_labels;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// External hostname for a route. DNS records depend on this exact format.
pub fn route_host(name: &str, port: u16, domain_suffix: &str) -> String {
    format!("{}-{}.{}", name, port, domain_suffix)
}

/// Builds the Ingress routing `<name>-<port>.<suffix>` to the Service `name`.
pub struct RouteBuilder {
    name: String,
    port: u16,
    config: RouteConfig,
}

impl RouteBuilder {
    pub fn new(name: String, port: u16, config: RouteConfig) -> Self {
        Self { name, port, config }
    }

    pub fn host(&self) -> String {
        route_host(&self.name, self.port, &self.config.domain_suffix)
    }

    pub fn build(&self) -> Ingress {
        let backend = IngressBackend {
            service: Some(IngressServiceBackend {
                name: self.name.clone(),
                port: Some(ServiceBackendPort {
                    number: Some(ENDPOINT_PORT),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };

        let rule = IngressRule {
            host: Some(self.host()),
            http: Some(HTTPIngressRuleValue {
                paths: vec![HTTPIngressPath {
                    path: Some(ROUTE_PATH.to_string()),
                    path_type: PATH_TYPE_PREFIX.to_string(),
                    backend,
                }],
            }),
        };

        Ingress {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(resource_labels(&self.name)),
                ..Default::default()
            },
            spec: Some(IngressSpec {
                ingress_class_name: Some(self.config.ingress_class.clone()),
                rules: Some(vec![rule]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_host_format() {
        assert_eq!(
            route_host("myapp", 8080, "r.localdev.me"),
            "myapp-8080.r.localdev.me"
        );
    }

    #[test]
    fn test_route_shape() {
        let ingress = RouteBuilder::new("web".to_string(), 3000, RouteConfig::default()).build();
        let spec = ingress.spec.as_ref().unwrap();

        assert_eq!(ingress.metadata.name.as_deref(), Some("web"));
        assert_eq!(spec.ingress_class_name.as_deref(), Some("nginx"));

        let rules = spec.rules.as_ref().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].host.as_deref(), Some("web-3000.r.localdev.me"));

        let path = &rules[0].http.as_ref().unwrap().paths[0];
        assert_eq!(path.path.as_deref(), Some("/"));
        assert_eq!(path.path_type, "Prefix");

        let service = path.backend.service.as_ref().unwrap();
        assert_eq!(service.name, "web");
        assert_eq!(service.port.as_ref().and_then(|p| p.number), Some(80));
    }
}
