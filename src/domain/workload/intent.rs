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

//! The user's intent: run `image` under `name`, optionally routed on `port`.

use crate::domain::config::kubernetes::dns_label_violation;
use crate::shared::error::ValidationError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    name: String,
    image: String,
    port: Option<u16>,
}

impl Intent {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            port: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_image(&self.image)?;
        if let Some(port) = self.port {
            validate_port(u32::from(port))?;
        }
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    match dns_label_violation(name) {
        Some(reason) => Err(ValidationError::invalid_identifier(name, reason)),
        None => Ok(()),
    }
}

pub fn validate_image(image: &str) -> Result<(), ValidationError> {
    if image.is_empty() {
        return Err(ValidationError::invalid_image(image, "must not be empty"));
    }
    if image.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_image(
            image,
            "must not contain whitespace",
        ));
    }
    Ok(())
}

/// Accepts a port in 1..=65535.
pub fn validate_port(port: u32) -> Result<u16, ValidationError> {
    match u16::try_from(port) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(ValidationError::InvalidPort { port }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_intent() {
        let intent = Intent::new("myapp", "nginx:1.27").with_port(8080);
        assert!(intent.validate().is_ok());
        assert_eq!(intent.port(), Some(8080));
    }

    #[test]
    fn test_invalid_name() {
        let err = Intent::new("INVALID_NAME!", "nginx").validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_invalid_image() {
        let err = Intent::new("myapp", "").validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidImage { .. }));

        let err = Intent::new("myapp", "nginx latest").validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidImage { .. }));
    }

    #[test]
    fn test_port_range() {
        assert_eq!(validate_port(1), Ok(1));
        assert_eq!(validate_port(65535), Ok(65535));
        assert_eq!(
            validate_port(0),
            Err(ValidationError::InvalidPort { port: 0 })
        );
        assert_eq!(
            validate_port(65536),
            Err(ValidationError::InvalidPort { port: 65536 })
        );

        let err = Intent::new("myapp", "nginx").with_port(0).validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidPort { port: 0 });
    }
}
