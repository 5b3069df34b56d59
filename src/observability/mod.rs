// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout The Tripwire. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between log lines
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - Run lifecycle and evaluation rounds
//! * `messages::trigger` - Trigger registration, firing and predicate failures
//! * `messages::action` - Action dispatch, merge and failure events
//! * `messages::pipeline` - Document pipeline stage events
//!
//! # Usage
//!
//! ```rust
//! use the_tripwire::observability::messages::StructuredLog;
//! use the_tripwire::observability::messages::action::ActionMerged;
//!
//! let msg = ActionMerged {
//!     trigger: "extract",
//!     action: "extraction",
//!     changed: true,
//! };
//!
//! msg.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the process-wide `fmt` subscriber.
///
/// Honors `RUST_LOG`, falling back to `default_filter`. Calling it twice is
/// harmless; the second install is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
