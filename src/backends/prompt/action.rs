// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::backends::prompt::template::render;
use crate::backends::prompt::Completion;
use crate::traits::{Action, State};

/// Turns a completion reply into a partial update.
pub type ReplyParser<S> = Arc<dyn Fn(&str) -> anyhow::Result<<S as State>::Patch> + Send + Sync>;

/// An action that asks a [`Completion`] and parses what comes back.
pub struct PromptAction<S: State> {
    name: String,
    template: String,
    completion: Arc<dyn Completion>,
    parse: ReplyParser<S>,
}

impl<S: State> PromptAction<S> {
    pub fn new<F>(name: impl Into<String>, template: impl Into<String>, completion: Arc<dyn Completion>, parse: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<S::Patch> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            template: template.into(),
            completion,
            parse: Arc::new(parse),
        }
    }
}

#[async_trait]
impl<S> Action<S> for PromptAction<S>
where
    S: State + Serialize,
{
    async fn execute(&self, state: S) -> anyhow::Result<S::Patch> {
        let context = serde_json::to_value(&state).context("state is not representable as JSON")?;
        let prompt = render(&self.template, &context)?;
        tracing::debug!(action = %self.name, prompt_len = prompt.len(), "Sending prompt");

        let reply = self
            .completion
            .complete(&prompt)
            .await
            .with_context(|| format!("completion for '{}' failed", self.name))?;

        (self.parse)(strip_code_blocks(&reply))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Strip a markdown code fence wrapped around a reply.
pub fn strip_code_blocks(reply: &str) -> &str {
    reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Deserialize a reply as JSON, failing with the offending text attached.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> anyhow::Result<T> {
    let reply = strip_code_blocks(reply);
    serde_json::from_str(reply).with_context(|| {
        let preview: String = reply.chars().take(80).collect();
        format!("reply is not the expected JSON: '{}'", preview)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::prompt::ScriptedCompletion;
    use crate::traits::JsonState;
    use serde_json::{json, Map, Value};

    fn summarize(completion: Arc<ScriptedCompletion>) -> PromptAction<JsonState> {
        PromptAction::new(
            "summarize",
            "Summarize: {{document}}",
            completion,
            |reply: &str| {
                let summary: Value = parse_json_reply(reply)?;
                Ok(JsonState::patch(json!({ "summary": summary })))
            },
        )
    }

    #[tokio::test]
    async fn renders_prompt_and_parses_reply() {
        let completion = Arc::new(ScriptedCompletion::new(["```json\n{\"words\": 2}\n```"]));
        let action = summarize(completion.clone());

        let patch: Map<String, Value> = action
            .execute(JsonState::from(json!({ "document": "two words" })))
            .await
            .unwrap();

        assert_eq!(patch.get("summary"), Some(&json!({ "words": 2 })));
        assert_eq!(completion.prompts(), vec!["Summarize: two words"]);
        assert_eq!(action.name(), "summarize");
    }

    #[tokio::test]
    async fn malformed_reply_is_an_action_error() {
        let completion = Arc::new(ScriptedCompletion::new(["Sure! Here is your summary."]));

        let err = summarize(completion)
            .execute(JsonState::from(json!({ "document": "text" })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("reply is not the expected JSON"));
    }

    #[tokio::test]
    async fn missing_template_field_fails_before_completion() {
        let completion = Arc::new(ScriptedCompletion::new(["{}"]));

        let err = summarize(completion.clone()).execute(JsonState::new()).await.unwrap_err();
        assert!(err.to_string().contains("'document'"));
        assert!(completion.prompts().is_empty());
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n[]\n```"), "[]");
        assert_eq!(strip_code_blocks(" {} "), "{}");
    }
}
