// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::document::{DocumentPatch, DocumentState, DocumentStatus, Extraction};
use crate::backends::prompt::action::{parse_json_reply, PromptAction};
use crate::backends::prompt::Completion;

pub const EXTRACTION_TEMPLATE: &str = "\
Extract the invoice fields from the document below. Reply with a single JSON
object with the keys vendor, invoice_number, date, currency, total and
line_items (a list of objects with description and amount). Use null for
anything you cannot find.

Document:
{{document}}";

/// A prompt-driven drop-in for the local extraction stage.
pub fn extraction_prompt(completion: Arc<dyn Completion>) -> PromptAction<DocumentState> {
    PromptAction::new("extract", EXTRACTION_TEMPLATE, completion, |reply: &str| {
        let extraction: Extraction = parse_json_reply(reply)?;
        Ok(DocumentPatch {
            extraction: Some(extraction),
            ..Default::default()
        }
        .with_status(DocumentStatus::Extracted))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::prompt::ScriptedCompletion;
    use crate::engine::{EngineBuilder, TriggerSpec};
    use crate::traits::Action;

    const REPLY: &str = r#"{
        "vendor": "Acme",
        "invoice_number": "INV-1",
        "date": null,
        "currency": "USD",
        "total": 20.0,
        "line_items": [{ "description": "widget", "amount": 20.0 }]
    }"#;

    #[tokio::test]
    async fn reply_becomes_extraction() {
        let completion = Arc::new(ScriptedCompletion::new([REPLY]));
        let state = DocumentState {
            document: Some("Vendor: Acme".to_string()),
            ..Default::default()
        };

        let patch = extraction_prompt(completion.clone()).execute(state).await.unwrap();
        let extraction = patch.extraction.unwrap();
        assert_eq!(extraction.vendor.as_deref(), Some("Acme"));
        assert_eq!(extraction.date, None);
        assert_eq!(extraction.line_items.len(), 1);
        assert_eq!(patch.status, Some(DocumentStatus::Extracted));
        assert!(completion.prompts()[0].ends_with("Document:\nVendor: Acme"));
    }

    #[tokio::test]
    async fn malformed_reply_stalls_pipeline_with_one_error() {
        let completion = Arc::new(ScriptedCompletion::new(["I could not read that invoice."]));
        let extract: Arc<dyn Action<DocumentState>> = Arc::new(extraction_prompt(completion));
        let engine = EngineBuilder::new().build(DocumentState::default());
        engine.register(
            TriggerSpec::once(
                |s: &DocumentState| s.document.is_some() && s.extraction.is_none(),
                vec![extract],
            )
            .labeled("extract"),
        );

        engine.start().unwrap();
        engine.set_state(DocumentPatch::document("Vendor: Acme"));
        engine.settle().await.unwrap();

        assert!(engine.state().extraction.is_none());
        assert!(engine.state().status.is_none());
        assert_eq!(engine.error_count(), 1);
        engine.stop().await.unwrap();
    }
}
