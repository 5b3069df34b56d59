// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for trigger registration and firing.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A trigger was added to the registry.
///
/// # Log Level
/// `debug!` - Registration happens at setup time
///
/// # Example
/// ```
/// use the_tripwire::observability::messages::trigger::TriggerRegistered;
///
/// let msg = TriggerRegistered {
///     trigger: "extract",
///     mode: "once",
///     action_count: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct TriggerRegistered<'a> {
    pub trigger: &'a str,
    pub mode: &'a str,
    pub action_count: usize,
}

impl Display for TriggerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered {} trigger '{}' with {} actions",
            self.mode, self.trigger, self.action_count
        )
    }
}

impl StructuredLog for TriggerRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            trigger = self.trigger,
            mode = self.mode,
            action_count = self.action_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "trigger_registered",
            span_name = name,
            trigger = self.trigger,
            mode = self.mode,
        )
    }
}

/// A trigger matched and its actions are being dispatched.
///
/// # Log Level
/// `info!` - Each firing is a pipeline step
pub struct TriggerFired<'a> {
    pub trigger: &'a str,
    pub mode: &'a str,
    pub round: u64,
    pub firing: u64,
}

impl Display for TriggerFired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trigger '{}' ({}) fired in round {} as firing {}",
            self.trigger, self.mode, self.round, self.firing
        )
    }
}

impl StructuredLog for TriggerFired<'_> {
    fn log(&self) {
        tracing::info!(
            trigger = self.trigger,
            mode = self.mode,
            round = self.round,
            firing = self.firing,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "firing",
            span_name = name,
            trigger = self.trigger,
            firing = self.firing,
        )
    }
}

/// A predicate failed and was treated as non-matching.
///
/// # Log Level
/// `warn!` - The round continues
pub struct PredicateFailed<'a> {
    pub trigger: &'a str,
    pub error: &'a anyhow::Error,
}

impl Display for PredicateFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Predicate of trigger '{}' failed, treating as no match: {:#}",
            self.trigger, self.error
        )
    }
}

impl StructuredLog for PredicateFailed<'_> {
    fn log(&self) {
        tracing::warn!(trigger = self.trigger, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "predicate_failed",
            span_name = name,
            trigger = self.trigger,
            error = %self.error,
        )
    }
}
