// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::EngineError;
use crate::observability::messages::action::{ErrorHandlerPanicked, ErrorReported};
use crate::observability::messages::StructuredLog;

/// Callback receiving every predicate and action failure.
pub type ErrorHandler = Arc<dyn Fn(&EngineError) + Send + Sync>;

/// Single funnel for failures that happen inside the dispatch loop.
///
/// Every failure is logged. When a handler is configured it is then called
/// synchronously on the dispatch loop, so it should return quickly. A panic
/// inside the handler is caught and logged; it never takes the loop down.
pub struct ErrorSink {
    handler: Option<ErrorHandler>,
    reported: AtomicUsize,
}

impl ErrorSink {
    pub fn new(handler: Option<ErrorHandler>) -> Self {
        Self {
            handler,
            reported: AtomicUsize::new(0),
        }
    }

    pub fn report(&self, error: EngineError) {
        self.reported.fetch_add(1, Ordering::Relaxed);
        ErrorReported { error: &error }.log();

        if let Some(handler) = &self.handler {
            if catch_unwind(AssertUnwindSafe(|| handler(&error))).is_err() {
                ErrorHandlerPanicked {
                    trigger: error.trigger(),
                }
                .log();
            }
        }
    }

    /// Number of failures reported so far.
    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::Relaxed)
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new(None)
    }
}
