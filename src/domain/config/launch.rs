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

//! On-disk configuration for workload-kube
//!
//! Loaded from a TOML file. Every field is optional; missing sections fall
//! back to the defaults in [`crate::infrastructure::constants`].

use crate::domain::config::kubernetes::{GatewayConfig, RetryPolicy, RouteConfig};
use crate::infrastructure::constants::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_DOMAIN_SUFFIX, DEFAULT_INGRESS_CLASS, DEFAULT_MAX_RETRIES,
    DEFAULT_NAMESPACE, DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_RETRY_MIN_DELAY_MS,
};
use crate::shared::error::{KubeError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LaunchConf {
    pub kubernetes: KubernetesConf,
    pub retry: RetryConf,
    pub route: RouteConf,
}

impl LaunchConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            KubeError::config_error(format!(
                "Failed to read config file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        Ok(conf)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            namespace: self.kubernetes.namespace.clone(),
            kubeconfig: self.kubernetes.kubeconfig.clone(),
            context: self.kubernetes.context.clone(),
            call_timeout: Duration::from_secs(self.kubernetes.call_timeout_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            min_delay: Duration::from_millis(self.retry.min_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
        }
    }

    pub fn route_config(&self) -> RouteConfig {
        RouteConfig {
            domain_suffix: self.route.domain_suffix.clone(),
            ingress_class: self.route.ingress_class.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KubernetesConf {
    pub namespace: String,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub call_timeout_secs: u64,
}

impl Default for KubernetesConf {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            kubeconfig: None,
            context: None,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConf {
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConf {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay_ms: DEFAULT_RETRY_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteConf {
    pub domain_suffix: String,
    pub ingress_class: String,
}

impl Default for RouteConf {
    fn default() -> Self {
        Self {
            domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_string(),
            ingress_class: DEFAULT_INGRESS_CLASS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let conf: LaunchConf = toml::from_str(
            r#"
            [kubernetes]
            namespace = "apps"

            [route]
            domain_suffix = "apps.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(conf.kubernetes.namespace, "apps");
        assert_eq!(conf.kubernetes.call_timeout_secs, DEFAULT_CALL_TIMEOUT_SECS);
        assert_eq!(conf.route.domain_suffix, "apps.example.com");
        assert_eq!(conf.route.ingress_class, DEFAULT_INGRESS_CLASS);
        assert_eq!(conf.retry.max_retries, 0);
    }

    #[test]
    fn test_derived_runtime_configs() {
        let mut conf = LaunchConf::default();
        conf.kubernetes.call_timeout_secs = 5;
        conf.retry.max_retries = 3;
        conf.retry.min_delay_ms = 10;

        let gateway = conf.gateway_config();
        assert_eq!(gateway.namespace, "default");
        assert_eq!(gateway.call_timeout, Duration::from_secs(5));

        let retry = conf.retry_policy();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.min_delay, Duration::from_millis(10));
    }
}
