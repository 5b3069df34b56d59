// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use async_trait::async_trait;

use crate::backends::local::document::{
    DocumentPatch, DocumentState, DocumentStatus, Recommendation, Report, Severity,
};
use crate::backends::local::stages::require_extraction;
use crate::observability::messages::pipeline::StageCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::Action;

/// Report stage - summarizes a finished or rejected document
///
/// For a validated document it needs both the category and the anomaly
/// list, recommends by the worst anomaly severity, and completes the
/// document. For a rejected document it writes a rejection report and
/// leaves the status alone.
pub struct ReportStage;

impl ReportStage {
    pub fn build(state: &DocumentState) -> anyhow::Result<(Report, Option<DocumentStatus>)> {
        let extraction = require_extraction(state, "report")?;
        let invoice = format!(
            "Invoice {} from {}",
            extraction.invoice_number.as_deref().unwrap_or("(no number)"),
            extraction.vendor.as_deref().unwrap_or("(unknown vendor)")
        );

        if state.is(DocumentStatus::Rejected) {
            let errors = state
                .validation
                .as_ref()
                .map(|v| v.errors.join("; "))
                .unwrap_or_default();
            let report = Report {
                summary: format!("{} was rejected: {}", invoice, errors),
                recommendation: Recommendation::Reject,
            };
            return Ok((report, None));
        }

        let category = state
            .category
            .as_ref()
            .ok_or_else(|| anyhow!("report needs a category but none is present"))?;
        let anomalies = state
            .anomalies
            .as_ref()
            .ok_or_else(|| anyhow!("report needs anomaly results but none are present"))?;

        let recommendation = match anomalies.iter().map(|a| a.severity).max() {
            None | Some(Severity::Low) => Recommendation::Approve,
            Some(Severity::Medium) => Recommendation::Review,
            Some(Severity::High) => Recommendation::Reject,
        };

        let total = match (extraction.total, extraction.currency.as_deref()) {
            (Some(total), Some(currency)) => format!("{:.2} {}", total, currency),
            (Some(total), None) => format!("{:.2}", total),
            (None, _) => "no total".to_string(),
        };

        let mut summary = format!(
            "{} for {} categorized as {} ({:.0}% confidence) with {} anomalies",
            invoice,
            total,
            category.name,
            category.confidence * 100.0,
            anomalies.len()
        );
        for anomaly in anomalies {
            summary.push_str(&format!("\n  - {}", anomaly.detail));
        }

        Ok((
            Report {
                summary,
                recommendation,
            },
            Some(DocumentStatus::Completed),
        ))
    }
}

#[async_trait]
impl Action<DocumentState> for ReportStage {
    async fn execute(&self, state: DocumentState) -> anyhow::Result<DocumentPatch> {
        let (report, status) = Self::build(&state)?;

        StageCompleted {
            stage: "report",
            summary: format!("recommendation {:?}", report.recommendation),
        }
        .log();

        Ok(DocumentPatch {
            report: Some(report),
            status,
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "report"
    }
}
