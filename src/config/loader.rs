// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::consts::{
    DEFAULT_AMOUNT_THRESHOLD, DEFAULT_LINE_ITEM_TOLERANCE, DEFAULT_REQUIRED_FIELDS,
};
use crate::errors::ConfigError;

/// Top-level configuration.
///
/// Every section is optional; an empty file yields the defaults.
///
/// # Example
/// ```yaml
/// executor_options:
///   max_concurrency: 4
/// pipeline:
///   required_fields: [vendor, invoice_number, total]
///   anomaly:
///     amount_threshold: 10000.0
///     line_item_tolerance: 0.01
///   categories:
///     software: [license, subscription, saas]
///     travel: [flight, hotel]
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Engine options.
///
/// * `max_concurrency` - cap on actions executing at once; unbounded when absent
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// Settings for the document pipeline stages.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Extraction fields that must be present for a document to validate
    pub required_fields: Vec<String>,
    pub anomaly: AnomalyConfig,
    /// Category name to the keywords that vote for it
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            anomaly: AnomalyConfig::default(),
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnomalyConfig {
    pub amount_threshold: f64,
    pub line_item_tolerance: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            amount_threshold: DEFAULT_AMOUNT_THRESHOLD,
            line_item_tolerance: DEFAULT_LINE_ITEM_TOLERANCE,
        }
    }
}

fn default_categories() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("software", &["license", "subscription", "saas", "software", "cloud"]),
        ("hardware", &["laptop", "monitor", "server", "keyboard", "hardware"]),
        ("travel", &["flight", "hotel", "airfare", "taxi", "mileage"]),
        ("services", &["consulting", "support", "maintenance", "hours", "services"]),
        ("office", &["paper", "toner", "stationery", "furniture", "supplies"]),
    ];

    table
        .iter()
        .map(|(name, keywords)| {
            (
                name.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and reject settings the engine or the
/// pipeline cannot run with.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
