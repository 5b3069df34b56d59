// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::backends::local::document::{
    DocumentPatch, DocumentState, DocumentStatus, Extraction, Validation,
};
use crate::backends::local::stages::require_extraction;
use crate::observability::messages::pipeline::StageCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::Action;

/// Validation stage - checks the extraction for required and sane fields
///
/// Missing required fields and a non-positive total are errors and reject
/// the document. Missing optional fields are warnings only.
pub struct ValidateStage {
    required_fields: Vec<String>,
}

impl ValidateStage {
    pub fn new(required_fields: Vec<String>) -> Self {
        Self { required_fields }
    }

    pub fn validate(&self, extraction: &Extraction) -> Validation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for field in &self.required_fields {
            if !extraction.has_field(field) {
                errors.push(format!("missing required field '{}'", field));
            }
        }

        if let Some(total) = extraction.total {
            if total <= 0.0 {
                errors.push(format!("total must be positive, got {:.2}", total));
            }
        }

        for field in ["date", "currency", "line_items"] {
            if !extraction.has_field(field) && !self.required_fields.iter().any(|f| f == field) {
                warnings.push(format!("no {} found", field.replace('_', " ")));
            }
        }

        Validation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

#[async_trait]
impl Action<DocumentState> for ValidateStage {
    async fn execute(&self, state: DocumentState) -> anyhow::Result<DocumentPatch> {
        let validation = self.validate(require_extraction(&state, "validation")?);
        let status = if validation.is_valid {
            DocumentStatus::Validated
        } else {
            DocumentStatus::Rejected
        };

        StageCompleted {
            stage: "validation",
            summary: format!(
                "{} ({} errors, {} warnings)",
                if validation.is_valid { "valid" } else { "invalid" },
                validation.errors.len(),
                validation.warnings.len()
            ),
        }
        .log();

        Ok(DocumentPatch {
            validation: Some(validation),
            ..Default::default()
        }
        .with_status(status))
    }

    fn name(&self) -> &str {
        "validate"
    }
}
