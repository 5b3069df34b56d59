// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Prompt-driven actions.
//!
//! A [`PromptAction`] renders a template against a JSON view of the state,
//! hands the prompt to a [`Completion`] and turns the reply into a partial
//! update through a parse callback. The engine sees an ordinary action; a
//! reply that fails to parse is an ordinary action error.
//!
//! No model client ships here. [`ScriptedCompletion`] replays canned replies
//! for demos and tests, and real clients implement [`Completion`] themselves.

pub mod action;
pub mod document;
pub mod template;

pub use action::{parse_json_reply, strip_code_blocks, PromptAction};
pub use document::extraction_prompt;
pub use template::render;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Anything that can answer a prompt with text.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Replies with queued answers in order and records every prompt it saw.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        self.replies
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted completion lock poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left for prompt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_come_back_in_order() {
        let completion = ScriptedCompletion::new(["first", "second"]);

        assert_eq!(completion.complete("a").await.unwrap(), "first");
        assert_eq!(completion.complete("b").await.unwrap(), "second");
        assert!(completion.complete("c").await.is_err());
        assert_eq!(completion.prompts(), vec!["a", "b", "c"]);
    }
}
