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

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KubeError>;

/// Setup-time failures: loading configuration and reaching the cluster.
///
/// Orchestration failures are never raised through this type; they are
/// reported as tagged results (see [`FailureCause`]).
#[derive(Error, Debug)]
pub enum KubeError {
    #[error("Kubernetes API error: {0}")]
    KubeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl KubeError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }
}

/// A bad intent. Never reaches the cluster.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("invalid port {port}: must be within 1-65535")]
    InvalidPort { port: u32 },

    #[error("invalid image '{image}': {reason}")]
    InvalidImage { image: String, reason: String },
}

impl ValidationError {
    pub fn invalid_identifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_image(image: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            image: image.into(),
            reason: reason.into(),
        }
    }
}

/// A remote failure as classified by a cluster gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum GatewayError {
    /// Network, timeout or server-side overload. The caller may retry.
    #[error("transient cluster failure: {0}")]
    Transient(String),

    /// Validation, quota or admission rejection. Not retryable.
    #[error("rejected by cluster: {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Why an orchestration did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    #[error(transparent)]
    Validation(ValidationError),

    #[error(transparent)]
    Cluster(GatewayError),

    #[error("operation cancelled")]
    Cancelled,
}

impl FailureCause {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::ValidationError,
            Self::Cluster(GatewayError::Transient(_)) => ErrorCategory::TransientClusterError,
            Self::Cluster(GatewayError::Rejected(_)) => ErrorCategory::RejectedByCluster,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

impl From<ValidationError> for FailureCause {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<GatewayError> for FailureCause {
    fn from(err: GatewayError) -> Self {
        Self::Cluster(err)
    }
}

/// Caller-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ValidationError,
    /// The resource was already present under the same name; treated as success.
    ConflictButSatisfied,
    TransientClusterError,
    RejectedByCluster,
    /// A later step failed and the compensating rollback failed too.
    /// Manual cleanup is required.
    PartialProvisioning,
    Cancelled,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::ConflictButSatisfied => "ConflictButSatisfied",
            Self::TransientClusterError => "TransientClusterError",
            Self::RejectedByCluster => "RejectedByCluster",
            Self::PartialProvisioning => "PartialProvisioning",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_cause_category() {
        let cause = FailureCause::from(GatewayError::transient("connection reset"));
        assert_eq!(cause.category(), ErrorCategory::TransientClusterError);

        let cause = FailureCause::from(GatewayError::rejected("quota exceeded"));
        assert_eq!(cause.category(), ErrorCategory::RejectedByCluster);

        let cause = FailureCause::from(ValidationError::InvalidPort { port: 0 });
        assert_eq!(cause.category(), ErrorCategory::ValidationError);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::invalid_identifier("Bad_Name", "uppercase not allowed");
        assert_eq!(
            err.to_string(),
            "invalid identifier 'Bad_Name': uppercase not allowed"
        );

        let err = ValidationError::InvalidPort { port: 70000 };
        assert_eq!(err.to_string(), "invalid port 70000: must be within 1-65535");
    }

    #[test]
    fn test_toml_errors_convert() {
        fn parse(content: &str) -> Result<toml::Value> {
            Ok(toml::from_str(content)?)
        }

        let err = parse("[retry\n").unwrap_err();
        assert!(matches!(err, KubeError::TomlParse(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
        assert!(matches!(
            KubeError::config_error("bad"),
            KubeError::ConfigError(msg) if msg == "bad"
        ));
    }

    #[test]
    fn test_cause_is_transparent() {
        let cause = FailureCause::from(GatewayError::rejected("admission denied"));
        assert_eq!(cause.to_string(), "rejected by cluster: admission denied");
    }
}
