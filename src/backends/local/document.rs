// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed state for the invoice-processing pipeline.
//!
//! Each stage owns one field of [`DocumentState`] and fills it through a
//! [`DocumentPatch`]. `status` tracks how far the document has come and is
//! what most stage predicates key on.

use serde::{Deserialize, Serialize};

use crate::traits::State;

/// How far a document has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Extracted,
    Validated,
    Rejected,
    Completed,
}

/// Structured fields pulled out of the raw document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    pub date: Option<String>,
    pub currency: Option<String>,
    pub total: Option<f64>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Extraction {
    /// Whether the named field carries a value. Unknown names are absent.
    pub fn has_field(&self, field: &str) -> bool {
        match field {
            "vendor" => self.vendor.is_some(),
            "invoice_number" => self.invoice_number.is_some(),
            "date" => self.date.is_some(),
            "currency" => self.currency.is_some(),
            "total" => self.total.is_some(),
            "line_items" => !self.line_items.is_empty(),
            _ => false,
        }
    }

    pub fn line_item_sum(&self) -> f64 {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Share of all keyword hits that voted for this category, 0.0 to 1.0.
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    HighValue,
    TotalMismatch,
    DuplicateLineItem,
    NonPositiveAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    Review,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    pub recommendation: Recommendation,
}

/// The whole pipeline state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    pub document: Option<String>,
    pub status: Option<DocumentStatus>,
    pub extraction: Option<Extraction>,
    pub validation: Option<Validation>,
    pub category: Option<Category>,
    pub anomalies: Option<Vec<Anomaly>>,
    pub report: Option<Report>,
}

impl DocumentState {
    pub fn is(&self, status: DocumentStatus) -> bool {
        self.status == Some(status)
    }
}

/// Sparse update to a [`DocumentState`]. `Some` fields overwrite; `None`
/// fields are left alone, so no stage can clear another stage's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub document: Option<String>,
    pub status: Option<DocumentStatus>,
    pub extraction: Option<Extraction>,
    pub validation: Option<Validation>,
    pub category: Option<Category>,
    pub anomalies: Option<Vec<Anomaly>>,
    pub report: Option<Report>,
}

impl DocumentPatch {
    pub fn document(text: impl Into<String>) -> Self {
        Self {
            document: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }
}

fn overwrite<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(value) if slot.as_ref() != Some(&value) => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

impl State for DocumentState {
    type Patch = DocumentPatch;

    fn merge(&mut self, patch: DocumentPatch) -> bool {
        // Non-short-circuiting `|` so every field is applied.
        overwrite(&mut self.document, patch.document)
            | overwrite(&mut self.status, patch.status)
            | overwrite(&mut self.extraction, patch.extraction)
            | overwrite(&mut self.validation, patch.validation)
            | overwrite(&mut self.category, patch.category)
            | overwrite(&mut self.anomalies, patch.anomalies)
            | overwrite(&mut self.report, patch.report)
    }
}
