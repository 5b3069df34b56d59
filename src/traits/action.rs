// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::traits::state::State;

/// An asynchronous unit of work plugged into the engine.
///
/// An action receives a snapshot of the state and produces a partial update,
/// or fails with an arbitrary error. The engine merges successful results back
/// into the store; failures go to the error sink and nothing is merged.
/// Actions may do arbitrary I/O but must not assume when they run relative to
/// other actions.
#[async_trait]
pub trait Action<S: State>: Send + Sync {
    async fn execute(&self, state: S) -> anyhow::Result<S::Patch>;

    /// Name used in logs and error reports.
    fn name(&self) -> &str {
        "action"
    }
}

/// Adapter turning an async closure into an [`Action`].
pub struct FnAction<S, F> {
    name: String,
    f: F,
    _state: PhantomData<fn(S)>,
}

impl<S, F> FnAction<S, F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _state: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F, Fut> Action<S> for FnAction<S, F>
where
    S: State,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<S::Patch>> + Send + 'static,
{
    async fn execute(&self, state: S) -> anyhow::Result<S::Patch> {
        (self.f)(state).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a shareable action from an async closure.
///
/// ```
/// use serde_json::json;
/// use the_tripwire::traits::{action_fn, JsonState};
///
/// let _set_b = action_fn("set_b", |_state: JsonState| async move {
///     Ok(JsonState::patch(json!({ "b": true })))
/// });
/// ```
pub fn action_fn<S, F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn Action<S>>
where
    S: State,
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<S::Patch>> + Send + 'static,
{
    Arc::new(FnAction::new(name, f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::state::JsonState;
    use serde_json::json;

    #[tokio::test]
    async fn fn_action_runs_closure_against_snapshot() {
        let action = action_fn("double", |state: JsonState| async move {
            let n = state.get_i64("n").unwrap_or(0);
            Ok(JsonState::patch(json!({ "n": n * 2 })))
        });

        let patch = action
            .execute(JsonState::from(json!({ "n": 21 })))
            .await
            .unwrap();

        assert_eq!(patch.get("n"), Some(&json!(42)));
        assert_eq!(action.name(), "double");
    }

    #[tokio::test]
    async fn fn_action_propagates_errors() {
        let action = action_fn("broken", |_state: JsonState| async move {
            Err::<serde_json::Map<String, serde_json::Value>, _>(anyhow::anyhow!("malformed output"))
        });

        let err = action.execute(JsonState::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "malformed output");
    }
}
