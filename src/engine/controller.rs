// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::builder::EngineBuilder;
use crate::engine::error_sink::ErrorSink;
use crate::engine::evaluator::{Activity, DispatchLoop, EngineCore, LoopEvent};
use crate::engine::registry::{TriggerId, TriggerSpec};
use crate::errors::LifecycleError;
use crate::observability::messages::engine::{RunStarted, RunStopped};
use crate::observability::messages::StructuredLog;
use crate::traits::{Action, State};

/// Lifecycle status of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Stopped,
}

/// Handles to a live run.
struct RunHandle<S: State> {
    events: mpsc::UnboundedSender<LoopEvent<S>>,
    activity: Arc<watch::Sender<Activity>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<S: State> RunHandle<S> {
    /// Count a round as owed, then ask the loop for it.
    fn schedule_round(&self) {
        self.activity.send_modify(|a| a.queued_rounds += 1);
        if self.events.send(LoopEvent::Evaluate).is_err() {
            self.activity.send_modify(|a| a.queued_rounds = a.queued_rounds.saturating_sub(1));
        }
    }
}

enum RunSlot<S: State> {
    Idle,
    Running(RunHandle<S>),
    Stopped,
}

/// Reactive orchestration engine.
///
/// Callers never invoke stages directly. They register triggers (a predicate
/// plus an ordered list of actions), start the engine, and mutate state. After
/// every change the engine re-evaluates all triggers in registration order,
/// dispatches the ones that newly match, and merges their results back into
/// state, which in turn can satisfy further triggers.
///
/// # Example
/// ```
/// use serde_json::json;
/// use the_tripwire::{action_fn, Engine, JsonState};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), the_tripwire::LifecycleError> {
/// let engine = Engine::new(JsonState::new());
/// engine.once(
///     |state: &JsonState| state.is_truthy("a"),
///     vec![action_fn("set_b", |_state: JsonState| async move {
///         Ok(JsonState::patch(json!({ "b": 2 })))
///     })],
/// );
///
/// engine.start()?;
/// engine.set_state(JsonState::patch(json!({ "a": 1 })));
/// engine.settle().await?;
/// assert_eq!(engine.state().get_i64("b"), Some(2));
/// engine.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct Engine<S: State> {
    core: Arc<EngineCore<S>>,
    run: Mutex<RunSlot<S>>,
    max_concurrency: Option<usize>,
}

impl<S: State> Engine<S> {
    /// Engine with default options: unbounded concurrency, errors only logged.
    pub fn new(initial: S) -> Self {
        EngineBuilder::new().build(initial)
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(initial: S, sink: ErrorSink, max_concurrency: Option<usize>) -> Self {
        Self {
            core: Arc::new(EngineCore::new(initial, sink)),
            run: Mutex::new(RunSlot::Idle),
            max_concurrency,
        }
    }

    fn slot(&self) -> MutexGuard<'_, RunSlot<S>> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a trigger. Allowed at any time; while running, a round is
    /// scheduled so an already-satisfied trigger fires without waiting for an
    /// unrelated change.
    pub fn register(&self, spec: TriggerSpec<S>) -> TriggerId {
        let id = self.core.registry().register(spec);
        if let RunSlot::Running(handle) = &*self.slot() {
            handle.schedule_round();
        }
        id
    }

    /// Fire `actions` at most once per run, the first time `predicate` holds.
    pub fn once<F>(&self, predicate: F, actions: Vec<Arc<dyn Action<S>>>) -> TriggerId
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.register(TriggerSpec::once(predicate, actions))
    }

    /// Fire `actions` whenever `predicate` holds and the trigger is armed.
    ///
    /// A trigger starts armed and is disarmed when it fires. While a firing
    /// is in flight the trigger counts as not matching. It is armed again
    /// when a round finds `predicate` false, or when its latest firing
    /// finishes having changed state. So `when(a, [set b = 1])` fires twice
    /// while `a` stays true: the second firing writes the same value and the
    /// trigger stays disarmed until `a` goes false.
    pub fn when<F>(&self, predicate: F, actions: Vec<Arc<dyn Action<S>>>) -> TriggerId
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.register(TriggerSpec::always(predicate, actions))
    }

    /// Begin a run and evaluate the current state right away.
    ///
    /// Must be called from within a tokio runtime. Starting again after
    /// [`stop`](Self::stop) begins a fresh run in which once-triggers may fire
    /// again.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut slot = self.slot();
        if let RunSlot::Running(_) = &*slot {
            return Err(LifecycleError::AlreadyRunning);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LifecycleError::NoRuntime)?;

        let trigger_count = {
            let mut registry = self.core.registry();
            registry.reset_for_run();
            registry.len()
        };

        let (events, receiver) = mpsc::unbounded_channel();
        let (activity, _) = watch::channel(Activity::default());
        let activity = Arc::new(activity);
        let cancel = CancellationToken::new();

        let dispatch = DispatchLoop::new(
            self.core.clone(),
            receiver,
            events.clone(),
            activity.clone(),
            self.max_concurrency,
            cancel.clone(),
        );

        RunStarted {
            trigger_count,
            max_concurrency: self.max_concurrency,
        }
        .log();

        let handle = RunHandle {
            events,
            activity,
            cancel,
            task: runtime.spawn(dispatch.run()),
        };
        handle.schedule_round();
        *slot = RunSlot::Running(handle);
        Ok(())
    }

    /// Merge a partial update. While running, a change schedules a round.
    /// Returns whether anything changed.
    pub fn set_state(&self, patch: S::Patch) -> bool {
        let slot = self.slot();
        match &*slot {
            RunSlot::Running(handle) => {
                // Count the round before the merge lands so a concurrent
                // settle() cannot observe the new state as quiescent.
                handle.activity.send_modify(|a| a.queued_rounds += 1);
                let changed = self.core.store.merge(patch);
                if !changed || handle.events.send(LoopEvent::Evaluate).is_err() {
                    handle
                        .activity
                        .send_modify(|a| a.queued_rounds = a.queued_rounds.saturating_sub(1));
                }
                changed
            }
            RunSlot::Idle | RunSlot::Stopped => self.core.store.merge(patch),
        }
    }

    /// Wait until no round is owed and no action is in flight.
    ///
    /// Resolves immediately when the run is already quiescent, and also when
    /// the run is stopped while waiting. An action that never completes keeps
    /// this pending forever; the engine imposes no timeout of its own.
    pub async fn settle(&self) -> Result<(), LifecycleError> {
        let (mut activity, cancel) = match &*self.slot() {
            RunSlot::Running(handle) => (handle.activity.subscribe(), handle.cancel.clone()),
            RunSlot::Idle | RunSlot::Stopped => return Err(LifecycleError::NotRunning),
        };

        tokio::select! {
            _ = activity.wait_for(Activity::is_quiescent) => {}
            _ = cancel.cancelled() => {}
        }
        Ok(())
    }

    /// End the run. In-flight actions keep running, but nothing they produce
    /// is merged once this returns.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let handle = {
            let mut slot = self.slot();
            match std::mem::replace(&mut *slot, RunSlot::Stopped) {
                RunSlot::Running(handle) => handle,
                other => {
                    *slot = other;
                    return Err(LifecycleError::NotRunning);
                }
            }
        };

        handle.cancel.cancel();
        if let Err(e) = handle.task.await {
            tracing::warn!(error = %e, "dispatch loop did not shut down cleanly");
        }

        let activity = *handle.activity.borrow();
        RunStopped {
            rounds: activity.rounds,
            in_flight: activity.in_flight,
        }
        .log();
        Ok(())
    }

    /// Snapshot of the current state; valid in any status.
    pub fn state(&self) -> S {
        self.core.store.read()
    }

    pub fn status(&self) -> RunStatus {
        match &*self.slot() {
            RunSlot::Idle => RunStatus::Idle,
            RunSlot::Running(_) => RunStatus::Running,
            RunSlot::Stopped => RunStatus::Stopped,
        }
    }

    /// Number of failures reported to the error sink since construction.
    pub fn error_count(&self) -> usize {
        self.core.sink.reported()
    }

    /// Pending-work counters of the current run, `None` when not running.
    pub fn activity(&self) -> Option<Activity> {
        match &*self.slot() {
            RunSlot::Running(handle) => Some(*handle.activity.borrow()),
            RunSlot::Idle | RunSlot::Stopped => None,
        }
    }
}

impl<S: State> Drop for Engine<S> {
    fn drop(&mut self) {
        if let RunSlot::Running(handle) = &*self.slot() {
            handle.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::JsonState;
    use serde_json::json;

    #[tokio::test]
    async fn status_follows_lifecycle() {
        let engine = Engine::new(JsonState::new());
        assert_eq!(engine.status(), RunStatus::Idle);

        engine.start().unwrap();
        assert_eq!(engine.status(), RunStatus::Running);

        engine.stop().await.unwrap();
        assert_eq!(engine.status(), RunStatus::Stopped);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let engine = Engine::new(JsonState::new());
        engine.start().unwrap();

        assert_eq!(engine.start(), Err(LifecycleError::AlreadyRunning));
        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn settle_and_stop_require_a_run() {
        let engine = Engine::new(JsonState::new());

        assert_eq!(engine.settle().await, Err(LifecycleError::NotRunning));
        assert_eq!(engine.stop().await, Err(LifecycleError::NotRunning));

        engine.start().unwrap();
        engine.stop().await.unwrap();

        assert_eq!(engine.settle().await, Err(LifecycleError::NotRunning));
        assert_eq!(engine.stop().await, Err(LifecycleError::NotRunning));
        assert_eq!(engine.status(), RunStatus::Stopped);
    }

    #[test]
    fn start_outside_runtime_is_rejected() {
        let engine = Engine::new(JsonState::new());
        assert_eq!(engine.start(), Err(LifecycleError::NoRuntime));
        assert_eq!(engine.status(), RunStatus::Idle);
    }

    #[test]
    fn set_state_before_start_establishes_initial_state() {
        let engine = Engine::new(JsonState::new());

        assert!(engine.set_state(JsonState::patch(json!({ "a": 1 }))));
        assert!(!engine.set_state(JsonState::patch(json!({ "a": 1 }))));
        assert_eq!(engine.state().get_i64("a"), Some(1));
    }

    #[tokio::test]
    async fn settle_resolves_immediately_with_no_triggers() {
        let engine = Engine::new(JsonState::new());
        engine.start().unwrap();

        engine.settle().await.unwrap();
        engine.settle().await.unwrap();

        let activity = engine.activity().unwrap();
        assert!(activity.is_quiescent());
        assert_eq!(activity.rounds, 1);
        engine.stop().await.unwrap();
        assert!(engine.activity().is_none());
    }

    #[tokio::test]
    async fn no_op_set_state_does_not_schedule_a_round() {
        let engine = Engine::new(JsonState::from(json!({ "a": 1 })));
        engine.start().unwrap();
        engine.settle().await.unwrap();

        assert!(!engine.set_state(JsonState::patch(json!({ "a": 1 }))));
        engine.settle().await.unwrap();
        assert_eq!(engine.activity().unwrap().rounds, 1);

        assert!(engine.set_state(JsonState::patch(json!({ "a": 2 }))));
        engine.settle().await.unwrap();
        assert_eq!(engine.activity().unwrap().rounds, 2);
        engine.stop().await.unwrap();
    }
}
