// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Problems found while validating a loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `executor_options.max_concurrency` was set to zero
    ZeroConcurrency,
    /// A required field name the validation stage does not know
    UnknownRequiredField {
        /// The unrecognized field name
        field: String,
    },
    /// A category with no keywords can never match
    EmptyCategory {
        /// The category name
        category: String,
    },
    /// An anomaly threshold that is negative or not a number
    InvalidThreshold {
        /// Which threshold
        name: &'static str,
        /// The configured value
        value: f64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroConcurrency => {
                write!(f, "executor_options.max_concurrency must be at least 1")
            }
            ValidationError::UnknownRequiredField { field } => {
                write!(f, "Unknown required field '{}'", field)
            }
            ValidationError::EmptyCategory { category } => {
                write!(f, "Category '{}' has no keywords", category)
            }
            ValidationError::InvalidThreshold { name, value } => {
                write!(f, "Anomaly threshold '{}' must be a non-negative number, got {}", name, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors from loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ValidationError>),
}
