// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::observability::messages::trigger::TriggerRegistered;
use crate::observability::messages::StructuredLog;
use crate::traits::{Action, Predicate, State};

/// Identifier handed out by registration, unique per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(pub(crate) u64);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger-{}", self.0)
    }
}

/// Identifier of one dispatch of a trigger's action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FiringId(pub(crate) u64);

/// How often a trigger may fire during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireMode {
    /// At most one firing per run.
    Once,
    /// Fires on every non-match to match transition of its predicate.
    Always,
}

impl FireMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FireMode::Once => "once",
            FireMode::Always => "always",
        }
    }
}

/// Everything needed to register a trigger.
///
/// ```
/// use serde_json::json;
/// use the_tripwire::{action_fn, JsonState, TriggerSpec};
///
/// let spec = TriggerSpec::once(
///     |state: &JsonState| state.is_truthy("a"),
///     vec![action_fn("set_b", |_s: JsonState| async move {
///         Ok(JsonState::patch(json!({ "b": true })))
///     })],
/// )
/// .labeled("a_sets_b");
/// assert_eq!(spec.label(), Some("a_sets_b"));
/// ```
pub struct TriggerSpec<S: State> {
    label: Option<String>,
    predicate: Arc<dyn Predicate<S>>,
    actions: Vec<Arc<dyn Action<S>>>,
    mode: FireMode,
}

impl<S: State> TriggerSpec<S> {
    pub fn new<P>(mode: FireMode, predicate: P, actions: Vec<Arc<dyn Action<S>>>) -> Self
    where
        P: Predicate<S> + 'static,
    {
        Self {
            label: None,
            predicate: Arc::new(predicate),
            actions,
            mode,
        }
    }

    pub fn once<P>(predicate: P, actions: Vec<Arc<dyn Action<S>>>) -> Self
    where
        P: Predicate<S> + 'static,
    {
        Self::new(FireMode::Once, predicate, actions)
    }

    pub fn always<P>(predicate: P, actions: Vec<Arc<dyn Action<S>>>) -> Self
    where
        P: Predicate<S> + 'static,
    {
        Self::new(FireMode::Always, predicate, actions)
    }

    /// Name used in logs and error reports instead of the numeric id.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn mode(&self) -> FireMode {
        self.mode
    }
}

/// A registered trigger plus its per-run firing state.
pub(crate) struct Trigger<S: State> {
    pub(crate) id: TriggerId,
    pub(crate) name: String,
    pub(crate) predicate: Arc<dyn Predicate<S>>,
    pub(crate) actions: Vec<Arc<dyn Action<S>>>,
    pub(crate) mode: FireMode,
    /// Once-mode only: already fired this run.
    pub(crate) consumed: bool,
    /// Always-mode only: the next match is an edge.
    pub(crate) armed: bool,
    /// Latest firing; only its completion may re-arm the trigger.
    pub(crate) last_firing: Option<FiringId>,
}

impl<S: State> Trigger<S> {
    fn reset(&mut self) {
        self.consumed = false;
        self.armed = true;
        self.last_firing = None;
    }
}

/// Ordered collection of triggers. Evaluation order is registration order.
pub(crate) struct TriggerRegistry<S: State> {
    triggers: Vec<Trigger<S>>,
    next_id: u64,
}

impl<S: State> TriggerRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            triggers: Vec::new(),
            next_id: 1,
        }
    }

    pub(crate) fn register(&mut self, spec: TriggerSpec<S>) -> TriggerId {
        let id = TriggerId(self.next_id);
        self.next_id += 1;

        let name = spec.label.unwrap_or_else(|| id.to_string());
        TriggerRegistered {
            trigger: &name,
            mode: spec.mode.as_str(),
            action_count: spec.actions.len(),
        }
        .log();

        self.triggers.push(Trigger {
            id,
            name,
            predicate: spec.predicate,
            actions: spec.actions,
            mode: spec.mode,
            consumed: false,
            armed: true,
            last_firing: None,
        });
        id
    }

    /// Forget all firing history; called when a new run starts.
    pub(crate) fn reset_for_run(&mut self) {
        for trigger in &mut self.triggers {
            trigger.reset();
        }
    }

    /// Re-arm an always-mode trigger after its latest firing changed state.
    /// Arm an ALWAYS trigger again after its latest firing. Returns whether
    /// the trigger was armed, in which case it needs another evaluation.
    pub(crate) fn rearm(&mut self, id: TriggerId, firing: FiringId) -> bool {
        match self.triggers.iter_mut().find(|t| t.id == id) {
            Some(trigger) if trigger.mode == FireMode::Always && trigger.last_firing == Some(firing) => {
                trigger.armed = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Trigger<S>> {
        self.triggers.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.triggers.len()
    }
}
