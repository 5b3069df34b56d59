// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the document pipeline stages.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A document stage produced its result.
///
/// # Log Level
/// `info!` - Pipeline progress
///
/// # Example
/// ```
/// use the_tripwire::observability::messages::pipeline::StageCompleted;
///
/// let msg = StageCompleted {
///     stage: "categorization",
///     summary: "software (0.75)".to_string(),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct StageCompleted<'a> {
    pub stage: &'a str,
    pub summary: String,
}

impl Display for StageCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' completed: {}", self.stage, self.summary)
    }
}

impl StructuredLog for StageCompleted<'_> {
    fn log(&self) {
        tracing::info!(stage = self.stage, summary = %self.summary, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("stage", span_name = name, stage = self.stage)
    }
}
