// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashSet;

use crate::backends::local::document::{
    Anomaly, AnomalyKind, DocumentPatch, DocumentState, Extraction, Severity,
};
use crate::backends::local::stages::require_extraction;
use crate::config::AnomalyConfig;
use crate::observability::messages::pipeline::StageCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::Action;

/// Anomaly detection stage - rule checks over the extracted amounts
pub struct AnomalyStage {
    config: AnomalyConfig,
}

impl AnomalyStage {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, extraction: &Extraction) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        if let Some(total) = extraction.total {
            if total > self.config.amount_threshold {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::HighValue,
                    severity: Severity::Medium,
                    detail: format!(
                        "total {:.2} exceeds threshold {:.2}",
                        total, self.config.amount_threshold
                    ),
                });
            }

            if !extraction.line_items.is_empty() {
                let sum = extraction.line_item_sum();
                if (total - sum).abs() > self.config.line_item_tolerance {
                    anomalies.push(Anomaly {
                        kind: AnomalyKind::TotalMismatch,
                        severity: Severity::High,
                        detail: format!("total {:.2} does not match line items summing to {:.2}", total, sum),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for item in &extraction.line_items {
            // Amounts compared in cents to keep them hashable.
            let key = (item.description.to_lowercase(), (item.amount * 100.0).round() as i64);
            if !seen.insert(key) {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::DuplicateLineItem,
                    severity: Severity::Medium,
                    detail: format!("line item '{}' ({:.2}) appears more than once", item.description, item.amount),
                });
            }

            if item.amount <= 0.0 {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::NonPositiveAmount,
                    severity: Severity::Low,
                    detail: format!("line item '{}' has amount {:.2}", item.description, item.amount),
                });
            }
        }

        anomalies
    }
}

#[async_trait]
impl Action<DocumentState> for AnomalyStage {
    async fn execute(&self, state: DocumentState) -> anyhow::Result<DocumentPatch> {
        let anomalies = self.detect(require_extraction(&state, "anomaly detection")?);

        StageCompleted {
            stage: "anomaly_detection",
            summary: format!("{} anomalies", anomalies.len()),
        }
        .log();

        Ok(DocumentPatch {
            anomalies: Some(anomalies),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "detect_anomalies"
    }
}
