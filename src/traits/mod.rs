// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod action;
pub mod predicate;
pub mod state;

pub use action::{action_fn, Action, FnAction};
pub use predicate::{Predicate, TryPredicate};
pub use state::{JsonState, State};
