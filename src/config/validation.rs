// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration checks run after parsing.
//!
//! All problems are collected rather than stopping at the first, so a user
//! fixing a config sees everything wrong with it in one pass.

use crate::config::consts::KNOWN_EXTRACTION_FIELDS;
use crate::config::Config;
use crate::errors::ValidationError;

/// Validate a parsed configuration.
///
/// ```
/// use the_tripwire::config::{validate_config, Config};
///
/// let mut config = Config::default();
/// assert!(validate_config(&config).is_ok());
///
/// config.executor_options.max_concurrency = Some(0);
/// assert_eq!(validate_config(&config).unwrap_err().len(), 1);
/// ```
pub fn validate_config(cfg: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if cfg.executor_options.max_concurrency == Some(0) {
        errors.push(ValidationError::ZeroConcurrency);
    }

    for field in &cfg.pipeline.required_fields {
        if !KNOWN_EXTRACTION_FIELDS.contains(&field.as_str()) {
            errors.push(ValidationError::UnknownRequiredField {
                field: field.clone(),
            });
        }
    }

    for (category, keywords) in &cfg.pipeline.categories {
        if keywords.iter().all(|k| k.trim().is_empty()) {
            errors.push(ValidationError::EmptyCategory {
                category: category.clone(),
            });
        }
    }

    let anomaly = &cfg.pipeline.anomaly;
    for (name, value) in [
        ("amount_threshold", anomaly.amount_threshold),
        ("line_item_tolerance", anomaly.line_item_tolerance),
    ] {
        if value.is_nan() || value < 0.0 {
            errors.push(ValidationError::InvalidThreshold { name, value });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
