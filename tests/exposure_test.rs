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

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use workload_kube::domain::workload::ExposeResult;
    use workload_kube::infrastructure::kubernetes::resources::{
        ResourceKind, ResourceSpec, ResourceSpecBuilder,
    };
    use workload_kube::{
        ErrorCategory, FailureCause, GatewayError, InMemoryGateway, Intent,
        RetryPolicy, RouteConfig, ValidationError, WorkloadDescriptor,
    };

    fn descriptor(gateway: Arc<InMemoryGateway>, route: RouteConfig) -> WorkloadDescriptor {
        WorkloadDescriptor::with_gateway(gateway, "apps".to_string(), RetryPolicy::none(), route)
    }

    #[test]
    fn test_route_host_is_deterministic() {
        let builder = ResourceSpecBuilder::default();
        let first = builder.build_route("myapp", 8080).unwrap();
        let second = builder.build_route("myapp", 8080).unwrap();

        assert_eq!(first, second);
        let host = first.spec.unwrap().rules.unwrap()[0].host.clone();
        assert_eq!(host.as_deref(), Some("myapp-8080.r.localdev.me"));
    }

    #[test]
    fn test_route_uses_configured_suffix_and_class() {
        let builder = ResourceSpecBuilder::new(RouteConfig {
            domain_suffix: "apps.example.com".to_string(),
            ingress_class: "traefik".to_string(),
        });
        let spec = builder.build_route("shop", 3000).unwrap().spec.unwrap();

        assert_eq!(spec.ingress_class_name.as_deref(), Some("traefik"));
        let rule = &spec.rules.unwrap()[0];
        assert_eq!(rule.host.as_deref(), Some("shop-3000.apps.example.com"));

        let path = &rule.http.as_ref().unwrap().paths[0];
        assert_eq!(path.path.as_deref(), Some("/"));
        assert_eq!(path.path_type, "Prefix");
        let backend = path.backend.service.as_ref().unwrap();
        assert_eq!(backend.name, "shop");
        assert_eq!(backend.port.as_ref().unwrap().number, Some(80));
    }

    #[tokio::test]
    async fn test_expose_twice_is_idempotent() {
        let gateway = Arc::new(InMemoryGateway::new());
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());
        let cancel = CancellationToken::new();

        let first = descriptor.expose_workload("myapp", 8080, &cancel).await;
        assert_eq!(
            first,
            ExposeResult::Exposed {
                route: "myapp".to_string(),
                host: "myapp-8080.r.localdev.me".to_string(),
            }
        );

        let second = descriptor.expose_workload("myapp", 8080, &cancel).await;
        assert_eq!(
            second,
            ExposeResult::AlreadyExposed {
                route: "myapp".to_string(),
                host: "myapp-8080.r.localdev.me".to_string(),
            }
        );
        assert!(second.is_success());
        assert_eq!(second.category(), Some(ErrorCategory::ConflictButSatisfied));
        assert_eq!(gateway.len(), 1);
    }

    #[tokio::test]
    async fn test_exposed_host_matches_route_rule() {
        let gateway = Arc::new(InMemoryGateway::new());
        let route = RouteConfig {
            domain_suffix: "apps.example.com".to_string(),
            ingress_class: "nginx".to_string(),
        };
        let descriptor = descriptor(gateway.clone(), route);

        let result = descriptor
            .expose_workload("shop", 443, &CancellationToken::new())
            .await;
        let host = match result {
            ExposeResult::Exposed { host, .. } => host,
            other => panic!("expected exposed, got {:?}", other),
        };
        assert_eq!(host, "shop-443.apps.example.com");

        let status = descriptor.status("shop").await.unwrap();
        assert_eq!(status.route.unwrap().hosts, vec![host]);
    }

    #[tokio::test]
    async fn test_expose_rejects_overlong_host_label() {
        let gateway = Arc::new(InMemoryGateway::new());
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());

        let result = descriptor
            .expose_workload(&"a".repeat(63), 8080, &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            ExposeResult::Failed {
                cause: FailureCause::Validation(ValidationError::InvalidIdentifier { .. })
            }
        ));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_expose_does_not_require_endpoint() {
        let gateway = Arc::new(InMemoryGateway::new());
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());

        let result = descriptor
            .expose_workload("ghost", 80, &CancellationToken::new())
            .await;

        assert!(matches!(result, ExposeResult::Exposed { .. }));
        assert!(!gateway.contains(ResourceKind::Endpoint, "ghost"));
        assert_eq!(gateway.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_expose_rejects_bad_input_without_calls() {
        let gateway = Arc::new(InMemoryGateway::new());
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());
        let cancel = CancellationToken::new();

        assert_eq!(
            descriptor.expose_workload("web", 0, &cancel).await,
            ExposeResult::Failed {
                cause: FailureCause::Validation(ValidationError::InvalidPort { port: 0 }),
            }
        );
        assert_eq!(
            descriptor.expose_workload("web", 70000, &cancel).await,
            ExposeResult::Failed {
                cause: FailureCause::Validation(ValidationError::InvalidPort { port: 70000 }),
            }
        );
        assert!(matches!(
            descriptor.expose_workload("Web", 80, &cancel).await,
            ExposeResult::Failed {
                cause: FailureCause::Validation(ValidationError::InvalidIdentifier { .. })
            }
        ));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_expose_failure_is_not_compensated() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.fail_next_create(ResourceKind::Route, GatewayError::transient("503"));
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());

        let result = descriptor
            .expose_workload("web", 8080, &CancellationToken::new())
            .await;

        assert_eq!(
            result,
            ExposeResult::Failed {
                cause: FailureCause::Cluster(GatewayError::transient("503")),
            }
        );
        assert_eq!(result.category(), Some(ErrorCategory::TransientClusterError));
        assert_eq!(gateway.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_status_reports_missing_route() {
        let gateway = Arc::new(InMemoryGateway::new());
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());
        descriptor
            .create_workload(&Intent::new("web", "nginx:1.27"), &CancellationToken::new())
            .await;

        let status = descriptor.status("web").await.unwrap();
        assert_eq!(status.name, "web");
        assert_eq!(status.namespace, "apps");
        assert!(status.is_complete());

        let workload = status.workload.unwrap();
        assert_eq!(workload.image.as_deref(), Some("nginx:1.27"));
        assert_eq!(workload.desired_replicas, 1);
        assert_eq!(workload.ready_replicas, 0);
        assert!(status.endpoint.is_some());
        assert!(status.route.is_none());
        assert_eq!(gateway.get_calls(), 3);
    }

    #[tokio::test]
    async fn test_status_lists_route_hosts() {
        let gateway = Arc::new(InMemoryGateway::new());
        let builder = ResourceSpecBuilder::default();
        gateway.insert(ResourceSpec::Route(builder.build_route("web", 9000).unwrap()));
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());

        let status = descriptor.status("web").await.unwrap();
        assert!(!status.is_complete());
        assert_eq!(
            status.route.unwrap().hosts,
            vec!["web-9000.r.localdev.me".to_string()]
        );
    }

    #[tokio::test]
    async fn test_status_rejects_invalid_name() {
        let gateway = Arc::new(InMemoryGateway::new());
        let descriptor = descriptor(gateway.clone(), RouteConfig::default());

        let err = descriptor.status("Not A Name").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);
        assert_eq!(gateway.get_calls(), 0);
    }
}
