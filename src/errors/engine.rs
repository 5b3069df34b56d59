// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failures routed through the error sink.
//!
//! These never reach the caller of an engine operation. They happen inside a
//! round or inside an action, get isolated there, and are handed to the
//! configured `on_error` handler while the dispatch loop keeps going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A predicate returned an error or panicked. The trigger counts as
    /// non-matching for that round.
    #[error("predicate of trigger '{trigger}' failed: {error:#}")]
    Predicate {
        trigger: String,
        error: anyhow::Error,
    },

    /// An action failed or panicked. Its result was not merged and the rest
    /// of its trigger's action list was abandoned.
    #[error("action '{action}' of trigger '{trigger}' failed: {error:#}")]
    Action {
        trigger: String,
        action: String,
        error: anyhow::Error,
    },
}

impl EngineError {
    /// Label (or id) of the trigger the failure belongs to.
    pub fn trigger(&self) -> &str {
        match self {
            EngineError::Predicate { trigger, .. } | EngineError::Action { trigger, .. } => trigger,
        }
    }

    /// The underlying failure.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            EngineError::Predicate { error, .. } | EngineError::Action { error, .. } => error,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Predicate { .. } => "predicate",
            EngineError::Action { .. } => "action",
        }
    }
}
