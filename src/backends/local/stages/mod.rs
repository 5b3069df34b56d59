// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The invoice pipeline stages, each an [`Action`](crate::traits::Action)
//! over [`DocumentState`](super::document::DocumentState).
//!
//! Stages never call each other. Each reads the fields it needs from its
//! snapshot and writes only its own output field (plus `status` where the
//! stage advances the document).

pub mod anomalies;
pub mod categorize;
pub mod extract;
pub mod report;
pub mod validate;

pub use anomalies::AnomalyStage;
pub use categorize::CategorizeStage;
pub use extract::ExtractStage;
pub use report::ReportStage;
pub use validate::ValidateStage;

use anyhow::Context;

use crate::backends::local::document::{DocumentState, Extraction};

/// The extraction a stage depends on, or an error naming the stage.
pub(crate) fn require_extraction<'a>(state: &'a DocumentState, stage: &str) -> anyhow::Result<&'a Extraction> {
    state
        .extraction
        .as_ref()
        .with_context(|| format!("{} needs an extraction but none is present", stage))
}
