// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Actions plugged into the engine.
//!
//! # Available Backends
//!
//! ## Local Backend
//! The invoice pipeline as in-process stages over a typed
//! [`DocumentState`](local::DocumentState): extraction, validation,
//! categorization, anomaly detection and reporting, wired together purely
//! through state by [`register_document_pipeline`](local::register_document_pipeline).
//!
//! ## Prompt Backend
//! [`PromptAction`](prompt::PromptAction) renders a template from state, asks
//! a pluggable [`Completion`](prompt::Completion) and parses the reply into a
//! partial update. Replies that fail to parse surface as action errors.
//!
//! ## Stub Backend (Test-Only)
//! Small `JsonState` actions for engine tests: fixed patches, counters,
//! failures, panics, gates and delays. Not available in production builds.

pub mod local;
pub mod prompt;
#[cfg(test)]
pub mod stub;
