// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::backends::local::document::{Category, DocumentPatch, DocumentState};
use crate::backends::local::stages::require_extraction;
use crate::observability::messages::pipeline::StageCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::Action;

/// Name used when no category keyword appears in the document.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Categorization stage - keyword voting over the document text
///
/// Every configured keyword found in the document or a line item
/// description is one vote for its category. The category with the most
/// votes wins (ties go to the alphabetically first name); confidence is its
/// share of all votes.
pub struct CategorizeStage {
    categories: BTreeMap<String, Vec<String>>,
}

impl CategorizeStage {
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    pub fn categorize(&self, text: &str) -> Category {
        let text = text.to_lowercase();
        let mut best: Option<(&str, Vec<String>)> = None;
        let mut total_votes = 0usize;

        for (name, keywords) in &self.categories {
            let matched: Vec<String> = keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty() && text.contains(k.as_str()))
                .collect();
            total_votes += matched.len();

            let better = match &best {
                Some((_, current)) => matched.len() > current.len(),
                None => !matched.is_empty(),
            };
            if better {
                best = Some((name.as_str(), matched));
            }
        }

        match best {
            Some((name, matched_keywords)) => Category {
                name: name.to_string(),
                confidence: matched_keywords.len() as f64 / total_votes as f64,
                matched_keywords,
            },
            None => Category {
                name: UNCATEGORIZED.to_string(),
                confidence: 0.0,
                matched_keywords: vec![],
            },
        }
    }
}

#[async_trait]
impl Action<DocumentState> for CategorizeStage {
    async fn execute(&self, state: DocumentState) -> anyhow::Result<DocumentPatch> {
        let extraction = require_extraction(&state, "categorization")?;

        let mut text = state.document.clone().unwrap_or_default();
        for item in &extraction.line_items {
            text.push('\n');
            text.push_str(&item.description);
        }
        let category = self.categorize(&text);

        StageCompleted {
            stage: "categorization",
            summary: format!("{} ({:.2})", category.name, category.confidence),
        }
        .log();

        Ok(DocumentPatch {
            category: Some(category),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "categorize"
    }
}
