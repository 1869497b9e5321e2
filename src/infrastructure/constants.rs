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

/// Resource labels
pub const LABEL_APP: &str = "app";
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "workload-kube";

/// Workload settings
pub const WORKLOAD_REPLICAS: i32 = 1;
pub const CONTAINER_PORT: i32 = 80;
pub const PORT_NAME_HTTP: &str = "http";

/// Endpoint settings
pub const ENDPOINT_PORT: i32 = 80;
pub const SERVICE_TYPE_CLUSTER_IP: &str = "ClusterIP";
pub const PROTOCOL_TCP: &str = "TCP";

/// Route settings
pub const DEFAULT_DOMAIN_SUFFIX: &str = "r.localdev.me";
pub const DEFAULT_INGRESS_CLASS: &str = "nginx";
pub const ROUTE_PATH: &str = "/";
pub const PATH_TYPE_PREFIX: &str = "Prefix";

/// Naming
pub const DNS_LABEL_MAX_LEN: usize = 63;

/// Cluster access
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Retry budget (no automatic retry unless configured)
pub const DEFAULT_MAX_RETRIES: usize = 0;
pub const DEFAULT_RETRY_MIN_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5_000;

/// Environment variable pointing at the configuration file
pub const CONF_FILE_ENV: &str = "WORKLOAD_KUBE_CONF";
