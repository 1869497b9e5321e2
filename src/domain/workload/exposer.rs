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
use crate::domain::workload::outcome::ExposeResult;
use crate::domain::workload::pipeline::create_with_retry;
use crate::infrastructure::kubernetes::client::{ClusterGateway, CreateOutcome};
use crate::infrastructure::kubernetes::resources::{ResourceSpec, ResourceSpecBuilder};
use crate::shared::error::FailureCause;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Attaches an external route to an existing endpoint.
///
/// Independent of provisioning. The endpoint's existence is not checked: the
/// control plane accepts a dangling route and traffic fails until the
/// endpoint appears.
pub struct RouteExposer {
    gateway: Arc<dyn ClusterGateway>,
    builder: ResourceSpecBuilder,
    retry: RetryPolicy,
}

impl RouteExposer {
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

    pub async fn expose(&self, name: &str, port: u32, cancel: &CancellationToken) -> ExposeResult {
        let (route, host) = match self.builder.build_route_with_host(name, port) {
            Ok((route, host)) => (ResourceSpec::Route(route), host),
            Err(e) => {
                warn!(name = %name, port = port, error = %e, "rejecting invalid expose request");
                return ExposeResult::Failed {
                    cause: FailureCause::Validation(e),
                };
            }
        };

        info!(name = %name, host = %host, "exposing workload");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FailureCause::Cancelled),
            result = create_with_retry(self.gateway.as_ref(), &route, &self.retry) => {
                result.map_err(FailureCause::Cluster)
            }
        };

        // Route failures are never compensated.
        match result {
            Ok(CreateOutcome::Created) => ExposeResult::Exposed {
                route: name.to_string(),
                host,
            },
            Ok(CreateOutcome::AlreadyExists) => {
                info!(name = %name, host = %host, "route already present");
                ExposeResult::AlreadyExposed {
                    route: name.to_string(),
                    host,
                }
            }
            Err(cause) => {
                warn!(name = %name, cause = %cause, "expose failed");
                ExposeResult::Failed { cause }
            }
        }
    }
}
