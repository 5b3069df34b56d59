// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::ExecutorOptions;
use crate::engine::controller::Engine;
use crate::engine::error_sink::{ErrorHandler, ErrorSink};
use crate::errors::EngineError;
use crate::traits::State;

/// Builder for [`Engine`] construction options.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use the_tripwire::{EngineBuilder, JsonState};
///
/// let failures = Arc::new(Mutex::new(Vec::new()));
/// let sink = failures.clone();
///
/// let engine = EngineBuilder::new()
///     .max_concurrency(4)
///     .on_error(move |e| sink.lock().unwrap().push(e.to_string()))
///     .build(JsonState::new());
/// # drop(engine);
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    max_concurrency: Option<usize>,
    on_error: Option<ErrorHandler>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from the `executor_options` config section.
    pub fn from_options(options: &ExecutorOptions) -> Self {
        Self {
            max_concurrency: options.max_concurrency,
            on_error: None,
        }
    }

    /// Cap the number of actions executing at once. Values below 1 are
    /// treated as 1.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit.max(1));
        self
    }

    /// Handler invoked synchronously for every predicate and action failure.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&EngineError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn build<S: State>(self, initial: S) -> Engine<S> {
        Engine::from_parts(initial, ErrorSink::new(self.on_error), self.max_concurrency)
    }
}
