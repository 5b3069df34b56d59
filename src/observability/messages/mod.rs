// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with typed fields attached.
//!
//! # Organization
//!
//! * `engine` - Run lifecycle and evaluation rounds
//! * `trigger` - Trigger registration and firing
//! * `action` - Action dispatch and completion
//! * `pipeline` - Document pipeline stages
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_tripwire::observability::messages::engine::RunStarted;
//!
//! let msg = RunStarted {
//!     trigger_count: 5,
//!     max_concurrency: Some(4),
//! };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod action;
pub mod engine;
pub mod pipeline;
pub mod trigger;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message at its level with its fields attached.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
