// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Invoice totals above this amount are flagged as high value
pub const DEFAULT_AMOUNT_THRESHOLD: f64 = 10_000.0;
/// Allowed difference between the stated total and the sum of line items
pub const DEFAULT_LINE_ITEM_TOLERANCE: f64 = 0.01;

/// Extraction fields the validation stage knows how to check
pub const KNOWN_EXTRACTION_FIELDS: &[&str] = &[
    "vendor",
    "invoice_number",
    "date",
    "currency",
    "total",
    "line_items",
];

/// Fields validation requires when the config does not say otherwise
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &["vendor", "invoice_number", "total"];
