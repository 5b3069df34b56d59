// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod document;
pub mod pipeline;
pub mod stages;


pub use document::{DocumentPatch, DocumentState, DocumentStatus};
pub use pipeline::register_document_pipeline;
pub use stages::*;
