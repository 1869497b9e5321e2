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
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_DOMAIN_SUFFIX, DEFAULT_INGRESS_CLASS, DEFAULT_MAX_RETRIES,
    DEFAULT_NAMESPACE, DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_RETRY_MIN_DELAY_MS, DNS_LABEL_MAX_LEN,
};
use crate::shared::error::KubeError;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// How to reach the control plane. Handed to the gateway constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub namespace: String,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    /// Upper bound for a single remote round trip.
    pub call_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            kubeconfig: None,
            context: None,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), KubeError> {
        if let Some(reason) = dns_label_violation(&self.namespace) {
            return Err(KubeError::ConfigError(format!(
                "Invalid namespace '{}': {}",
                self.namespace, reason
            )));
        }

        if self.call_timeout.is_zero() {
            return Err(KubeError::ConfigError(
                "call timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Retry budget for transient create failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first. Zero disables retrying.
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay: Duration::from_millis(DEFAULT_RETRY_MIN_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), KubeError> {
        if self.min_delay > self.max_delay {
            return Err(KubeError::ConfigError(format!(
                "retry min delay ({:?}) exceeds max delay ({:?})",
                self.min_delay, self.max_delay
            )));
        }
        Ok(())
    }
}

/// External routing settings consumed by the route builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub domain_suffix: String,
    pub ingress_class: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_string(),
            ingress_class: DEFAULT_INGRESS_CLASS.to_string(),
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<(), KubeError> {
        let suffix = &self.domain_suffix;
        if suffix.is_empty()
            || suffix.chars().any(char::is_whitespace)
            || suffix.split('.').any(str::is_empty)
        {
            return Err(KubeError::ConfigError(format!(
                "Invalid domain suffix: '{}'",
                self.domain_suffix
            )));
        }

        if self.ingress_class.is_empty() {
            return Err(KubeError::ConfigError(
                "ingress class must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn dns_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("DNS label pattern is valid")
    })
}

/// Returns why `name` is not an RFC 1123 DNS label, or `None` if it is one.
pub(crate) fn dns_label_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("must not be empty");
    }

    if name.len() > DNS_LABEL_MAX_LEN {
        return Some("must be at most 63 characters");
    }

    if !dns_label_regex().is_match(name) {
        return Some(
            "must consist of lowercase alphanumerics or '-', and start and end with an alphanumeric",
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_label_rules() {
        assert!(dns_label_violation("myapp").is_none());
        assert!(dns_label_violation("my-app-2").is_none());
        assert!(dns_label_violation("a").is_none());
        assert!(dns_label_violation(&"a".repeat(63)).is_none());

        assert!(dns_label_violation("").is_some());
        assert!(dns_label_violation(&"a".repeat(64)).is_some());
        assert!(dns_label_violation("MyApp").is_some());
        assert!(dns_label_violation("-myapp").is_some());
        assert!(dns_label_violation("myapp-").is_some());
        assert!(dns_label_violation("my_app").is_some());
        assert!(dns_label_violation("my.app").is_some());
        assert!(dns_label_violation("INVALID_NAME!").is_some());
    }

    #[test]
    fn test_gateway_config_validate() {
        assert!(GatewayConfig::default().validate().is_ok());

        let config = GatewayConfig {
            namespace: "Bad_NS".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            call_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy_validate() {
        assert!(RetryPolicy::default().validate().is_ok());

        let policy = RetryPolicy {
            max_retries: 2,
            min_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_route_config_validate() {
        assert!(RouteConfig::default().validate().is_ok());

        for suffix in [".example.com", "example.com.", "a..b", " example.com", "exa mple.com", ""] {
            let config = RouteConfig {
                domain_suffix: suffix.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "suffix {:?}", suffix);
        }

        let config = RouteConfig {
            domain_suffix: "apps.example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
