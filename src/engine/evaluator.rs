// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The evaluation round and the dispatch loop that drives it.
//!
//! ## Event-Driven Architecture
//!
//! One loop task owns every merge performed during a run. It receives events
//! over an unbounded channel:
//! - `Evaluate`: someone changed state (or started the run, or registered a
//!   trigger) and a round is owed
//! - `ActionSettled`: an action finished; its result is merged (or its error
//!   reported) in the order the completions arrive, then a round runs if the
//!   merge changed anything
//!
//! Matched triggers are dispatched as spawned tasks, so the loop never waits on
//! an action. Each firing task runs its trigger's actions in listed order and
//! waits for the loop to acknowledge every merge before starting the next
//! action, so later actions see earlier results.
//!
//! ## Quiescence
//!
//! The loop publishes an [`Activity`] on a `watch` channel: rounds owed but not
//! yet run, and firings still in flight. Counters are always raised before the
//! work they describe is handed over and lowered only after its follow-up work
//! has been counted, so the pair never reads zero while something is pending.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot, watch, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::error_sink::ErrorSink;
use crate::engine::registry::{FireMode, FiringId, TriggerId, TriggerRegistry};
use crate::engine::store::StateStore;
use crate::errors::EngineError;
use crate::observability::messages::action::ActionMerged;
use crate::observability::messages::engine::{DispatchLoopEnded, RoundEvaluated};
use crate::observability::messages::trigger::{PredicateFailed, TriggerFired};
use crate::observability::messages::StructuredLog;
use crate::traits::{Action, State};

/// State shared between the run controller, the loop and firing tasks.
pub(crate) struct EngineCore<S: State> {
    pub(crate) store: StateStore<S>,
    registry: Mutex<TriggerRegistry<S>>,
    pub(crate) sink: ErrorSink,
}

impl<S: State> EngineCore<S> {
    pub(crate) fn new(initial: S, sink: ErrorSink) -> Self {
        Self {
            store: StateStore::new(initial),
            registry: Mutex::new(TriggerRegistry::new()),
            sink,
        }
    }

    // Predicates run under this lock. A predicate that panics is caught
    // before unwinding past the guard, so poisoning only follows a bug in
    // the registry itself and the data is still usable.
    pub(crate) fn registry(&self) -> MutexGuard<'_, TriggerRegistry<S>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Work the run has not finished yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    /// Rounds requested but not yet evaluated.
    pub queued_rounds: usize,
    /// Firings whose action lists have not fully settled.
    pub in_flight: usize,
    /// Rounds evaluated so far in this run.
    pub rounds: u64,
}

impl Activity {
    pub fn is_quiescent(&self) -> bool {
        self.queued_rounds == 0 && self.in_flight == 0
    }
}

pub(crate) enum LoopEvent<S: State> {
    Evaluate,
    ActionSettled(Settlement<S>),
}

/// The outcome of one action, on its way back to the loop.
pub(crate) struct Settlement<S: State> {
    firing: FiringId,
    trigger: TriggerId,
    trigger_name: Arc<str>,
    action: String,
    outcome: anyhow::Result<S::Patch>,
    /// An earlier action of the same firing changed state.
    changed_before: bool,
    /// No further action of this firing will report.
    last: bool,
    /// Tells the firing task whether the merge changed state.
    ack: oneshot::Sender<bool>,
}

/// A matched trigger ready to be dispatched.
pub(crate) struct Firing<S: State> {
    pub(crate) id: FiringId,
    pub(crate) trigger: TriggerId,
    pub(crate) trigger_name: Arc<str>,
    pub(crate) actions: Vec<Arc<dyn Action<S>>>,
    /// Span the firing's actions run under.
    pub(crate) span: tracing::Span,
}

/// Evaluate every trigger against one snapshot, in registration order.
///
/// Once-mode triggers are marked consumed here, before any of their actions
/// run. Always-mode triggers fire only while armed; any non-match arms them.
pub(crate) fn evaluate_round<S: State>(
    registry: &mut TriggerRegistry<S>,
    snapshot: &S,
    sink: &ErrorSink,
    round: u64,
    next_firing: &mut u64,
) -> Vec<Firing<S>> {
    let mut fired = Vec::new();

    for trigger in registry.iter_mut() {
        if trigger.mode == FireMode::Once && trigger.consumed {
            continue;
        }

        let predicate = &trigger.predicate;
        let matched = match catch_unwind(AssertUnwindSafe(|| predicate.evaluate(snapshot))) {
            Ok(Ok(matched)) => matched,
            Ok(Err(error)) => {
                report_predicate_failure(sink, &trigger.name, error);
                false
            }
            Err(panic) => {
                let error = anyhow::anyhow!("predicate panicked: {}", panic_message(&panic));
                report_predicate_failure(sink, &trigger.name, error);
                false
            }
        };

        let fires = match trigger.mode {
            FireMode::Once => {
                if matched {
                    trigger.consumed = true;
                }
                matched
            }
            FireMode::Always => {
                if !matched {
                    trigger.armed = true;
                    false
                } else if trigger.armed {
                    trigger.armed = false;
                    true
                } else {
                    false
                }
            }
        };

        if fires {
            let id = FiringId(*next_firing);
            *next_firing += 1;
            trigger.last_firing = Some(id);

            let message = TriggerFired {
                trigger: &trigger.name,
                mode: trigger.mode.as_str(),
                round,
                firing: id.0,
            };
            message.log();
            let span = message.span("firing");

            fired.push(Firing {
                id,
                trigger: trigger.id,
                trigger_name: Arc::from(trigger.name.as_str()),
                actions: trigger.actions.clone(),
                span,
            });
        }
    }

    fired
}

fn report_predicate_failure(sink: &ErrorSink, trigger: &str, error: anyhow::Error) {
    PredicateFailed {
        trigger,
        error: &error,
    }
    .log();
    sink.report(EngineError::Predicate {
        trigger: trigger.to_string(),
        error,
    });
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// The single task that owns merges for a run.
pub(crate) struct DispatchLoop<S: State> {
    core: Arc<EngineCore<S>>,
    events: mpsc::UnboundedReceiver<LoopEvent<S>>,
    sender: mpsc::UnboundedSender<LoopEvent<S>>,
    activity: Arc<watch::Sender<Activity>>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    next_firing: u64,
}

impl<S: State> DispatchLoop<S> {
    pub(crate) fn new(
        core: Arc<EngineCore<S>>,
        events: mpsc::UnboundedReceiver<LoopEvent<S>>,
        sender: mpsc::UnboundedSender<LoopEvent<S>>,
        activity: Arc<watch::Sender<Activity>>,
        max_concurrency: Option<usize>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            core,
            events,
            sender,
            activity,
            limiter: max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1)))),
            cancel,
            next_firing: 1,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(LoopEvent::Evaluate) => {
                        self.run_round();
                        self.activity.send_modify(|a| a.queued_rounds = a.queued_rounds.saturating_sub(1));
                    }
                    Some(LoopEvent::ActionSettled(settlement)) => self.settle(settlement),
                    None => {
                        DispatchLoopEnded { reason: "event channel closed" }.log();
                        break;
                    }
                },
            }
        }
    }

    fn run_round(&mut self) {
        let snapshot = self.core.store.read();
        let round = self.activity.borrow().rounds + 1;

        let (evaluated, firings) = {
            let mut registry = self.core.registry();
            let firings = evaluate_round(
                &mut registry,
                &snapshot,
                &self.core.sink,
                round,
                &mut self.next_firing,
            );
            (registry.len(), firings)
        };

        // A trigger with no actions still consumes its firing but has
        // nothing to wait for.
        let dispatched: Vec<_> = firings.into_iter().filter(|f| !f.actions.is_empty()).collect();

        RoundEvaluated {
            round,
            evaluated,
            fired: dispatched.len(),
        }
        .log();

        self.activity.send_modify(|a| {
            a.rounds = round;
            a.in_flight += dispatched.len();
        });

        for firing in dispatched {
            let span = firing.span.clone();
            tokio::spawn(
                run_firing(
                    firing,
                    snapshot.clone(),
                    self.core.clone(),
                    self.sender.clone(),
                    self.limiter.clone(),
                )
                .instrument(span),
            );
        }
    }

    fn settle(&mut self, settlement: Settlement<S>) {
        let Settlement {
            firing,
            trigger,
            trigger_name,
            action,
            outcome,
            changed_before,
            last,
            ack,
        } = settlement;

        let changed = match outcome {
            Ok(patch) => {
                let changed = self.core.store.merge(patch);
                ActionMerged {
                    trigger: &trigger_name,
                    action: &action,
                    changed,
                }
                .log();
                changed
            }
            Err(error) => {
                self.core.sink.report(EngineError::Action {
                    trigger: trigger_name.to_string(),
                    action,
                    error,
                });
                false
            }
        };

        let rearmed = last && (changed_before || changed) && self.core.registry().rearm(trigger, firing);
        // Evaluate before releasing the in-flight slot so a re-armed trigger
        // is never left matching on a quiescent run.
        if changed || rearmed {
            self.run_round();
        }
        if last {
            self.activity.send_modify(|a| a.in_flight = a.in_flight.saturating_sub(1));
        }

        // The firing task may have gone away if the run is stopping.
        let _ = ack.send(changed);
    }
}

/// Run one firing's actions in listed order.
///
/// The first action sees the round's snapshot; each later one sees the store
/// after the previous merge. A failure abandons the rest of the list. If the
/// loop has stopped, sends and acknowledgements fail and the task just ends.
async fn run_firing<S: State>(
    firing: Firing<S>,
    snapshot: S,
    core: Arc<EngineCore<S>>,
    events: mpsc::UnboundedSender<LoopEvent<S>>,
    limiter: Option<Arc<Semaphore>>,
) {
    let count = firing.actions.len();
    let mut snapshot = Some(snapshot);
    let mut changed_before = false;

    for (index, action) in firing.actions.iter().enumerate() {
        let input = match snapshot.take() {
            Some(first) => first,
            None => core.store.read(),
        };

        let outcome = execute_isolated(action.clone(), input, limiter.clone()).await;
        let failed = outcome.is_err();
        let (ack, acked) = oneshot::channel();

        let settlement = Settlement {
            firing: firing.id,
            trigger: firing.trigger,
            trigger_name: firing.trigger_name.clone(),
            action: action.name().to_string(),
            outcome,
            changed_before,
            last: failed || index + 1 == count,
            ack,
        };
        if events.send(LoopEvent::ActionSettled(settlement)).is_err() {
            return;
        }

        match acked.await {
            Ok(changed) => changed_before |= changed,
            Err(_) => return,
        }
        if failed {
            return;
        }
    }
}

/// Execute an action on its own task so a panic becomes an ordinary error.
async fn execute_isolated<S: State>(
    action: Arc<dyn Action<S>>,
    input: S,
    limiter: Option<Arc<Semaphore>>,
) -> anyhow::Result<S::Patch> {
    let _permit = match limiter {
        Some(semaphore) => Some(
            semaphore
                .acquire_owned()
                .await
                .map_err(|e| anyhow::anyhow!("failed to acquire concurrency permit: {}", e))?,
        ),
        None => None,
    };

    match tokio::spawn(async move { action.execute(input).await }.in_current_span()).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            let panic = join_error.into_panic();
            Err(anyhow::anyhow!("action panicked: {}", panic_message(&panic)))
        }
        Err(join_error) => Err(anyhow::anyhow!("action task failed: {}", join_error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::registry::TriggerSpec;
    use crate::traits::{JsonState, TryPredicate};
    use serde_json::json;

    fn round(registry: &mut TriggerRegistry<JsonState>, state: &JsonState, sink: &ErrorSink) -> Vec<TriggerId> {
        let mut next = 1;
        evaluate_round(registry, state, sink, 1, &mut next)
            .into_iter()
            .map(|f| f.trigger)
            .collect()
    }

    #[test]
    fn once_trigger_is_consumed_on_first_match() {
        let mut registry = TriggerRegistry::new();
        let id = registry.register(TriggerSpec::once(|s: &JsonState| s.is_truthy("a"), vec![]));
        let sink = ErrorSink::default();
        let state = JsonState::from(json!({ "a": 1 }));

        assert_eq!(round(&mut registry, &state, &sink), vec![id]);
        assert!(round(&mut registry, &state, &sink).is_empty());
    }

    #[test]
    fn always_trigger_fires_on_edges_only() {
        let mut registry = TriggerRegistry::new();
        let id = registry.register(TriggerSpec::always(|s: &JsonState| s.is_truthy("on"), vec![]));
        let sink = ErrorSink::default();
        let on = JsonState::from(json!({ "on": true }));
        let off = JsonState::from(json!({ "on": false }));

        assert_eq!(round(&mut registry, &on, &sink), vec![id]);
        assert!(round(&mut registry, &on, &sink).is_empty());
        assert!(round(&mut registry, &off, &sink).is_empty());
        assert_eq!(round(&mut registry, &on, &sink), vec![id]);
    }

    #[test]
    fn matches_come_out_in_registration_order() {
        let mut registry = TriggerRegistry::new();
        let first = registry.register(TriggerSpec::once(|_s: &JsonState| true, vec![]));
        let skipped = registry.register(TriggerSpec::once(|_s: &JsonState| false, vec![]));
        let third = registry.register(TriggerSpec::always(|_s: &JsonState| true, vec![]));
        let sink = ErrorSink::default();

        let fired = round(&mut registry, &JsonState::new(), &sink);
        assert_eq!(fired, vec![first, third]);
        assert!(!fired.contains(&skipped));
    }

    #[test]
    fn failing_and_panicking_predicates_are_non_matches() {
        let mut registry = TriggerRegistry::new();
        registry.register(TriggerSpec::once(
            TryPredicate(|_s: &JsonState| -> anyhow::Result<bool> { Err(anyhow::anyhow!("bad field")) }),
            vec![],
        ));
        registry.register(TriggerSpec::once(|_s: &JsonState| -> bool { panic!("predicate bug") }, vec![]));
        let healthy = registry.register(TriggerSpec::once(|_s: &JsonState| true, vec![]));
        let sink = ErrorSink::default();

        assert_eq!(round(&mut registry, &JsonState::new(), &sink), vec![healthy]);
        assert_eq!(sink.reported(), 2);
    }

    #[test]
    fn firing_ids_increase_across_rounds() {
        let mut registry = TriggerRegistry::new();
        registry.register(TriggerSpec::always(|s: &JsonState| s.is_truthy("on"), vec![]));
        let sink = ErrorSink::default();
        let mut next = 1;

        let on = JsonState::from(json!({ "on": true }));
        let off = JsonState::new();
        let first = evaluate_round(&mut registry, &on, &sink, 1, &mut next);
        evaluate_round(&mut registry, &off, &sink, 2, &mut next);
        let second = evaluate_round(&mut registry, &on, &sink, 3, &mut next);

        assert_eq!(first[0].id, FiringId(1));
        assert_eq!(second[0].id, FiringId(2));
        assert_eq!(next, 3);
    }

    #[test]
    fn activity_is_quiescent_only_when_both_counters_are_zero() {
        assert!(Activity::default().is_quiescent());
        assert!(!Activity { queued_rounds: 1, ..Default::default() }.is_quiescent());
        assert!(!Activity { in_flight: 1, ..Default::default() }.is_quiescent());
    }
}
