// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::local::{register_document_pipeline, DocumentState};
use crate::config::Config;
use crate::engine::{Engine, EngineBuilder};

/// Document runtime builder - wires an engine and the invoice pipeline from
/// configuration.
///
/// # Examples
///
/// ```
/// use the_tripwire::config::{Config, RuntimeBuilder};
///
/// let engine = RuntimeBuilder::from_config(&Config::default());
/// assert!(engine.state().document.is_none());
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Engine built from `executor_options` with the pipeline registered.
    pub fn from_config(cfg: &Config) -> Engine<DocumentState> {
        Self::with_builder(cfg, EngineBuilder::from_options(&cfg.executor_options))
    }

    /// Like [`from_config`](Self::from_config) but starting from a caller's
    /// builder, e.g. one with an `on_error` handler attached. The builder's
    /// own concurrency limit is kept.
    pub fn with_builder(cfg: &Config, builder: EngineBuilder) -> Engine<DocumentState> {
        let engine = builder.build(DocumentState::default());
        register_document_pipeline(&engine, &cfg.pipeline);
        engine
    }
}
