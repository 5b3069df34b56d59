// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for run lifecycle and evaluation events.
//!
//! This module contains message types for logging events related to:
//! * Run start and stop
//! * Evaluation rounds and what they dispatched
//! * Results discarded because the run already stopped

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A run started and its initial round was scheduled.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_tripwire::observability::messages::engine::RunStarted;
///
/// let msg = RunStarted {
///     trigger_count: 6,
///     max_concurrency: None,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted {
    pub trigger_count: usize,
    pub max_concurrency: Option<usize>,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.max_concurrency {
            Some(limit) => write!(
                f,
                "Starting run: {} triggers, max_concurrency={}",
                self.trigger_count, limit
            ),
            None => write!(
                f,
                "Starting run: {} triggers, unbounded concurrency",
                self.trigger_count
            ),
        }
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(
            trigger_count = self.trigger_count,
            max_concurrency = ?self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            trigger_count = self.trigger_count,
            max_concurrency = ?self.max_concurrency,
        )
    }
}

/// A run stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunStopped {
    pub rounds: u64,
    pub in_flight: usize,
}

impl Display for RunStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run stopped after {} rounds; {} firings still in flight will be discarded",
            self.rounds, self.in_flight
        )
    }
}

impl StructuredLog for RunStopped {
    fn log(&self) {
        tracing::info!(
            rounds = self.rounds,
            in_flight = self.in_flight,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_stopped",
            span_name = name,
            rounds = self.rounds,
            in_flight = self.in_flight,
        )
    }
}

/// One evaluation round finished.
///
/// # Log Level
/// `debug!` - Emitted for every round
///
/// # Example
/// ```
/// use the_tripwire::observability::messages::engine::RoundEvaluated;
///
/// let msg = RoundEvaluated {
///     round: 3,
///     evaluated: 6,
///     fired: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct RoundEvaluated {
    pub round: u64,
    pub evaluated: usize,
    pub fired: usize,
}

impl Display for RoundEvaluated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Round {} evaluated {} triggers, {} fired",
            self.round, self.evaluated, self.fired
        )
    }
}

impl StructuredLog for RoundEvaluated {
    fn log(&self) {
        tracing::debug!(
            round = self.round,
            evaluated = self.evaluated,
            fired = self.fired,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "round",
            span_name = name,
            round = self.round,
            evaluated = self.evaluated,
            fired = self.fired,
        )
    }
}

/// The dispatch loop ended without being stopped.
///
/// # Log Level
/// `warn!` - Unexpected but recoverable
pub struct DispatchLoopEnded<'a> {
    pub reason: &'a str,
}

impl Display for DispatchLoopEnded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatch loop ended: {}", self.reason)
    }
}

impl StructuredLog for DispatchLoopEnded<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("dispatch_loop_ended", span_name = name, reason = self.reason)
    }
}
