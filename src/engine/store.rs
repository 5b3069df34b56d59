// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::traits::State;

/// Owner of the single mutable state value.
///
/// Every read and every merge goes through one lock, so a reader sees either
/// all of a merge or none of it, and concurrent merges are applied one after
/// another in the order they reach the lock.
pub struct StateStore<S: State> {
    state: Mutex<S>,
}

impl<S: State> StateStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }

    /// A consistent snapshot of the current state.
    pub fn read(&self) -> S {
        self.lock().clone()
    }

    /// Apply a partial update and report whether any field changed.
    pub fn merge(&self, patch: S::Patch) -> bool {
        self.lock().merge(patch)
    }

    // A panicking `State::merge` poisons the lock. Whatever it left behind
    // is still a state value, so keep serving it.
    fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
