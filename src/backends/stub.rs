// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::traits::{Action, JsonState};

/// An action that writes a fixed patch and counts its executions
pub struct SetFieldsAction {
    pub name: String,
    pub patch: Map<String, Value>,
    pub calls: Arc<AtomicUsize>,
}

impl SetFieldsAction {
    pub fn new(name: &str, patch: Value) -> Self {
        Self {
            name: name.to_string(),
            patch: JsonState::patch(patch),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Action<JsonState> for SetFieldsAction {
    async fn execute(&self, _state: JsonState) -> anyhow::Result<Map<String, Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.patch.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An action that adds one to an integer field
pub struct IncrementAction {
    pub field: String,
    pub calls: Arc<AtomicUsize>,
}

impl IncrementAction {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Action<JsonState> for IncrementAction {
    async fn execute(&self, state: JsonState) -> anyhow::Result<Map<String, Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = state.get_i64(&self.field).unwrap_or(0);
        let mut patch = Map::new();
        patch.insert(self.field.clone(), json!(current + 1));
        Ok(patch)
    }

    fn name(&self) -> &str {
        "increment"
    }
}

/// An action that always fails, simulating malformed model output
pub struct FailingAction {
    pub calls: Arc<AtomicUsize>,
}

impl FailingAction {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Action<JsonState> for FailingAction {
    async fn execute(&self, _state: JsonState) -> anyhow::Result<Map<String, Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("Simulated action failure"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// An action that panics
pub struct PanickingAction;

#[async_trait::async_trait]
impl Action<JsonState> for PanickingAction {
    async fn execute(&self, _state: JsonState) -> anyhow::Result<Map<String, Value>> {
        panic!("Simulated action panic")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// An action that blocks until the test releases it
pub struct GatedAction {
    pub gate: Arc<Semaphore>,
    pub started: Arc<AtomicUsize>,
    pub patch: Map<String, Value>,
}

impl GatedAction {
    pub fn new(patch: Value) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            started: Arc::new(AtomicUsize::new(0)),
            patch: JsonState::patch(patch),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Action<JsonState> for GatedAction {
    async fn execute(&self, _state: JsonState) -> anyhow::Result<Map<String, Value>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await?;
        permit.forget();
        Ok(self.patch.clone())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// An action that sleeps, writes one field and records peak concurrency
pub struct DelayedAction {
    pub field: String,
    pub value: Value,
    pub delay: Duration,
    pub active: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
}

impl DelayedAction {
    pub fn new(field: &str, value: Value, delay: Duration) -> Self {
        Self {
            field: field.to_string(),
            value,
            delay,
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Share concurrency counters with another probe.
    pub fn sharing(mut self, other: &DelayedAction) -> Self {
        self.active = other.active.clone();
        self.peak = other.peak.clone();
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Action<JsonState> for DelayedAction {
    async fn execute(&self, _state: JsonState) -> anyhow::Result<Map<String, Value>> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        let mut patch = Map::new();
        patch.insert(self.field.clone(), self.value.clone());
        Ok(patch)
    }

    fn name(&self) -> &str {
        &self.field
    }
}
