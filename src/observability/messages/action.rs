// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for action execution and the error sink.

use crate::errors::EngineError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An action result was merged into the store.
///
/// # Log Level
/// `debug!` - Emitted for every completed action
pub struct ActionMerged<'a> {
    pub trigger: &'a str,
    pub action: &'a str,
    pub changed: bool,
}

impl Display for ActionMerged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.changed {
            write!(f, "Merged result of '{}' (trigger '{}')", self.action, self.trigger)
        } else {
            write!(
                f,
                "Result of '{}' (trigger '{}') changed nothing",
                self.action, self.trigger
            )
        }
    }
}

impl StructuredLog for ActionMerged<'_> {
    fn log(&self) {
        tracing::debug!(
            trigger = self.trigger,
            action = self.action,
            changed = self.changed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "action_merged",
            span_name = name,
            trigger = self.trigger,
            action = self.action,
        )
    }
}

/// A failure reached the error sink.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_tripwire::errors::EngineError;
/// use the_tripwire::observability::messages::action::ErrorReported;
///
/// let error = EngineError::Action {
///     trigger: "validate".into(),
///     action: "validation".into(),
///     error: anyhow::anyhow!("missing field"),
/// };
/// let msg = ErrorReported { error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ErrorReported<'a> {
    pub error: &'a EngineError,
}

impl Display for ErrorReported<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StructuredLog for ErrorReported<'_> {
    fn log(&self) {
        tracing::error!(
            kind = self.error.kind(),
            trigger = self.error.trigger(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "error_reported",
            span_name = name,
            kind = self.error.kind(),
            trigger = self.error.trigger(),
        )
    }
}

/// The configured error handler panicked; the panic was contained.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ErrorHandlerPanicked<'a> {
    pub trigger: &'a str,
}

impl Display for ErrorHandlerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Error handler panicked while handling a failure of trigger '{}'",
            self.trigger
        )
    }
}

impl StructuredLog for ErrorHandlerPanicked<'_> {
    fn log(&self) {
        tracing::error!(trigger = self.trigger, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("error_handler_panicked", span_name = name, trigger = self.trigger)
    }
}
