// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::document::{DocumentState, DocumentStatus};
use crate::backends::local::stages::{
    AnomalyStage, CategorizeStage, ExtractStage, ReportStage, ValidateStage,
};
use crate::config::PipelineConfig;
use crate::engine::{Engine, TriggerId, TriggerSpec};
use crate::traits::Action;

fn stage<A: Action<DocumentState> + 'static>(action: A) -> Vec<Arc<dyn Action<DocumentState>>> {
    vec![Arc::new(action)]
}

/// Register the invoice pipeline on `engine`.
///
/// The stages are wired purely through state:
///
/// ```text
/// document ──▶ extract ──▶ validate ─┬─▶ categorize ───────┬─▶ report
///                                    ├─▶ detect_anomalies ─┘
///                                    └─▶ report_rejection
/// ```
///
/// Categorization and anomaly detection fire in the same round and run
/// concurrently. Every trigger is once-mode, so a run processes one
/// document. Returns the trigger ids in registration order.
pub fn register_document_pipeline(engine: &Engine<DocumentState>, config: &PipelineConfig) -> Vec<TriggerId> {
    vec![
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| s.document.is_some() && s.extraction.is_none(),
                stage(ExtractStage),
            )
            .labeled("extract"),
        ),
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| s.is(DocumentStatus::Extracted),
                stage(ValidateStage::new(config.required_fields.clone())),
            )
            .labeled("validate"),
        ),
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| s.is(DocumentStatus::Validated),
                stage(CategorizeStage::new(config.categories.clone())),
            )
            .labeled("categorize"),
        ),
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| s.is(DocumentStatus::Validated),
                stage(AnomalyStage::new(config.anomaly.clone())),
            )
            .labeled("detect_anomalies"),
        ),
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| {
                    s.is(DocumentStatus::Validated) && s.category.is_some() && s.anomalies.is_some()
                },
                stage(ReportStage),
            )
            .labeled("report"),
        ),
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| s.is(DocumentStatus::Rejected),
                stage(ReportStage),
            )
            .labeled("report_rejection"),
        ),
    ]
}
