// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // plugged-in actions
pub mod config;     // config + runtime wiring
pub mod engine;     // trigger engine
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // state, action, predicate abstractions

pub use engine::{Activity, Engine, EngineBuilder, FireMode, RunStatus, TriggerId, TriggerSpec};
pub use errors::{EngineError, LifecycleError};
pub use traits::{action_fn, Action, JsonState, Predicate, State, TryPredicate};
