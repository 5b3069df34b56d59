// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod builder;
pub mod controller;
pub mod error_sink;
pub mod evaluator;
pub mod registry;
pub mod store;

pub use builder::EngineBuilder;
pub use controller::{Engine, RunStatus};
pub use error_sink::{ErrorHandler, ErrorSink};
pub use evaluator::Activity;
pub use registry::{FireMode, TriggerId, TriggerSpec};
pub use store::StateStore;
