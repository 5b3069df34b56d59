// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context};
use async_trait::async_trait;

use crate::backends::local::document::{
    DocumentPatch, DocumentState, DocumentStatus, Extraction, LineItem,
};
use crate::observability::messages::pipeline::StageCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::Action;

/// Extraction stage - pulls invoice fields out of `key: value` text
///
/// Recognized lines (keys are case-insensitive):
/// ```text
/// Vendor: Acme Corp
/// Invoice #: INV-1001
/// Date: 2025-03-14
/// Currency: USD
/// Total: $1,250.00
/// - Annual license: $1,000.00
/// ```
pub struct ExtractStage;

#[async_trait]
impl Action<DocumentState> for ExtractStage {
    async fn execute(&self, state: DocumentState) -> anyhow::Result<DocumentPatch> {
        let text = state
            .document
            .as_deref()
            .context("extraction needs a document but none is present")?;
        let extraction = extract_fields(text)?;

        StageCompleted {
            stage: "extraction",
            summary: format!(
                "vendor={} total={} line_items={}",
                extraction.vendor.as_deref().unwrap_or("?"),
                extraction.total.map(|t| format!("{:.2}", t)).unwrap_or_else(|| "?".to_string()),
                extraction.line_items.len()
            ),
        }
        .log();

        Ok(DocumentPatch {
            extraction: Some(extraction),
            ..Default::default()
        }
        .with_status(DocumentStatus::Extracted))
    }

    fn name(&self) -> &str {
        "extract"
    }
}

/// Parse the recognized fields out of `text`.
///
/// Fails when nothing at all is recognized, or when a recognized amount
/// cannot be read as a number.
pub fn extract_fields(text: &str) -> anyhow::Result<Extraction> {
    let mut extraction = Extraction::default();
    let mut saw_dollar = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        saw_dollar |= line.contains('$');

        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            let (description, amount) = item
                .rsplit_once(':')
                .with_context(|| format!("line item '{}' has no amount", item))?;
            extraction.line_items.push(LineItem {
                description: description.trim().to_string(),
                amount: parse_amount(amount)?,
            });
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.trim().to_ascii_lowercase().as_str() {
            "vendor" | "from" => extraction.vendor = Some(value.to_string()),
            "invoice #" | "invoice number" | "invoice no" | "invoice" => {
                extraction.invoice_number = Some(value.to_string())
            }
            "date" | "invoice date" => extraction.date = Some(value.to_string()),
            "currency" => extraction.currency = Some(value.to_ascii_uppercase()),
            "total" | "amount due" => extraction.total = Some(parse_amount(value)?),
            _ => {}
        }
    }

    if extraction.currency.is_none() && saw_dollar {
        extraction.currency = Some("USD".to_string());
    }

    if extraction == Extraction::default() {
        return Err(anyhow!("no invoice fields found in document"));
    }
    Ok(extraction)
}

/// Read an amount such as `$1,250.00`, `1250 USD` or `-15.5`.
pub fn parse_amount(raw: &str) -> anyhow::Result<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
        .collect();

    cleaned
        .parse::<f64>()
        .with_context(|| format!("'{}' is not an amount", raw.trim()))
}
