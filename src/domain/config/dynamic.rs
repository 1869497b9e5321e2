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

use crate::domain::config::launch::LaunchConf;
use std::collections::HashMap;
use tracing::warn;

/// Apply `-D key=value` overrides on top of a loaded configuration.
///
/// Unknown keys and unparsable numbers are ignored with a warning.
pub fn apply_to_launch_conf(configs: &HashMap<String, String>, conf: &mut LaunchConf) {
    if let Some(namespace) = configs.get("kubernetes.namespace") {
        conf.kubernetes.namespace = namespace.clone();
    }

    if let Some(path) = configs.get("kubernetes.config.file") {
        conf.kubernetes.kubeconfig = Some(path.clone());
    }

    if let Some(context) = configs.get("kubernetes.context") {
        conf.kubernetes.context = Some(context.clone());
    }

    if let Some(value) = configs.get("kubernetes.call-timeout-secs") {
        if let Some(secs) = parse_number::<u64>("kubernetes.call-timeout-secs", value) {
            conf.kubernetes.call_timeout_secs = secs;
        }
    }

    if let Some(value) = configs.get("retry.max-retries") {
        if let Some(retries) = parse_number::<usize>("retry.max-retries", value) {
            conf.retry.max_retries = retries;
        }
    }

    if let Some(value) = configs.get("retry.min-delay-ms") {
        if let Some(ms) = parse_number::<u64>("retry.min-delay-ms", value) {
            conf.retry.min_delay_ms = ms;
        }
    }

    if let Some(value) = configs.get("retry.max-delay-ms") {
        if let Some(ms) = parse_number::<u64>("retry.max-delay-ms", value) {
            conf.retry.max_delay_ms = ms;
        }
    }

    if let Some(suffix) = configs.get("route.domain-suffix") {
        conf.route.domain_suffix = suffix.clone();
    }

    if let Some(class) = configs.get("route.ingress-class") {
        conf.route.ingress_class = class.clone();
    }

    for key in configs.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!(key = %key, "ignoring unknown dynamic property");
        }
    }
}

const KNOWN_KEYS: &[&str] = &[
    "kubernetes.namespace",
    "kubernetes.config.file",
    "kubernetes.context",
    "kubernetes.call-timeout-secs",
    "retry.max-retries",
    "retry.min-delay-ms",
    "retry.max-delay-ms",
    "route.domain-suffix",
    "route.ingress-class",
];

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key = %key, value = %value, "ignoring non-numeric dynamic property");
            None
        }
    }
}
