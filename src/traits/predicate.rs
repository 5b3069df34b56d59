// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::state::State;

/// A pure, synchronous test over a state snapshot.
///
/// Predicates run on every evaluation round, so they should be cheap and must
/// not have side effects. Plain `Fn(&S) -> bool` closures are predicates; use
/// [`TryPredicate`] for checks that can fail. A failed (or panicking)
/// predicate counts as a non-match for that round and is reported to the
/// error sink.
pub trait Predicate<S: State>: Send + Sync {
    fn evaluate(&self, state: &S) -> anyhow::Result<bool>;
}

impl<S, F> Predicate<S> for F
where
    S: State,
    F: Fn(&S) -> bool + Send + Sync,
{
    fn evaluate(&self, state: &S) -> anyhow::Result<bool> {
        Ok(self(state))
    }
}

/// Wraps a fallible check so it can be registered as a predicate.
///
/// ```
/// use the_tripwire::traits::{JsonState, Predicate, TryPredicate};
///
/// let needs_count = TryPredicate(|state: &JsonState| {
///     state
///         .get_i64("count")
///         .map(|n| n < 3)
///         .ok_or_else(|| anyhow::anyhow!("count is not an integer"))
/// });
/// assert!(needs_count.evaluate(&JsonState::new()).is_err());
/// ```
pub struct TryPredicate<F>(pub F);

impl<S, F> Predicate<S> for TryPredicate<F>
where
    S: State,
    F: Fn(&S) -> anyhow::Result<bool> + Send + Sync,
{
    fn evaluate(&self, state: &S) -> anyhow::Result<bool> {
        (self.0)(state)
    }
}
