// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use the_tripwire::backends::local::{DocumentPatch, DocumentState};
use the_tripwire::config::{load_and_validate_config, Config, RuntimeBuilder};
use the_tripwire::observability::init_tracing;
use the_tripwire::EngineBuilder;

/// A built-in document for `--demo`
struct DemoDocument {
    title: &'static str,
    text: &'static str,
}

const DEMO_DOCUMENTS: &[DemoDocument] = &[
    DemoDocument {
        title: "Well-formed invoice",
        text: include_str!("../demos/invoice.txt"),
    },
    DemoDocument {
        title: "Invoice missing its vendor",
        text: "Invoice #: INV-0007\nTotal: $80.00\n- Printer paper: $80.00\n",
    },
    DemoDocument {
        title: "Letter with no invoice fields",
        text: "Dear customer,\nthank you for your business.\n",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");
    let args: Vec<String> = env::args().collect();

    if args.len() >= 2 && args[1] == "--demo" {
        let config = match args.get(2) {
            Some(path) => load_and_validate_config(path)?,
            None => Config::default(),
        };
        for (i, demo) in DEMO_DOCUMENTS.iter().enumerate() {
            if i > 0 {
                println!("\n{}", "─".repeat(80));
            }
            println!("📄 {}", demo.title);
            run_document(&config, demo.text).await?;
        }
        return Ok(());
    }

    if args.len() != 3 {
        eprintln!("Usage: {} <config.yaml> <document.txt>", args[0]);
        eprintln!("       {} --demo [config.yaml]", args[0]);
        eprintln!("Example: {} configs/document-pipeline.yaml demos/invoice.txt", args[0]);
        std::process::exit(1);
    }

    let config = load_and_validate_config(&args[1])?;
    let text = fs::read_to_string(&args[2]).with_context(|| format!("failed to read document '{}'", args[2]))?;
    run_document(&config, &text).await
}

/// Run one document through the pipeline and print the final state.
async fn run_document(config: &Config, text: &str) -> anyhow::Result<()> {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = failures.clone();
    let builder = EngineBuilder::from_options(&config.executor_options).on_error(move |e| {
        if let Ok(mut failures) = sink.lock() {
            failures.push(e.to_string());
        }
    });
    let engine = RuntimeBuilder::with_builder(config, builder);

    let start = Instant::now();
    engine.start()?;
    engine.set_state(DocumentPatch::document(text));
    engine.settle().await?;
    engine.stop().await?;
    let elapsed = start.elapsed();

    let state: DocumentState = engine.state();
    println!("{}", serde_json::to_string_pretty(&state)?);
    println!();

    match (&state.status, &state.report) {
        (Some(status), Some(report)) => {
            println!("✅ Finished as {:?}, recommendation {:?}", status, report.recommendation)
        }
        _ => println!("⚠️  Pipeline stalled before producing a report"),
    }
    if let Ok(failures) = failures.lock() {
        for failure in failures.iter() {
            println!("❌ {}", failure);
        }
    }
    println!("⏱️  Settled in {:?}", elapsed);
    Ok(())
}
