// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod admin;
mod cli;
mod mailer;
mod processor_client;
mod routes;

#[cfg(test)]
mod tests;

use axum::Router;
use clap::Parser;
use rentbook_api::{BookingEngine, EngineConfig};
use rentbook_persistence::{ImportReport, Persistence};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::cli::Args;
use crate::mailer::HttpMailer;
use crate::processor_client::HttpPaymentProcessor;
use crate::routes::{AppState, build_router};

/// Reads a legacy export: either an array of documents or an object keyed
/// by booking id.
fn read_legacy_documents(path: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let raw: String = std::fs::read_to_string(path)?;
    let parsed: Value = serde_json::from_str(&raw)?;
    match parsed {
        Value::Array(documents) => Ok(documents),
        Value::Object(by_id) => Ok(by_id
            .into_iter()
            .map(|(id, mut document)| {
                if let Value::Object(fields) = &mut document {
                    fields
                        .entry("bookingId")
                        .or_insert_with(|| Value::String(id));
                }
                document
            })
            .collect()),
        _ => Err("legacy export must be a JSON array or object".into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing rentbook server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!(path = %db_path.display(), "Using file-based database");
        Persistence::new_with_file(db_path)?
    } else {
        warn!("Using in-memory database; bookings are lost on restart");
        Persistence::new_in_memory()?
    };

    if let Some(import_path) = &args.import_legacy {
        let documents: Vec<Value> = read_legacy_documents(import_path)?;
        let report: ImportReport =
            persistence.import_legacy_documents(&documents, OffsetDateTime::now_utc())?;
        for rejected in &report.rejected {
            warn!(reason = %rejected, "Legacy document not imported");
        }
        info!(
            path = %import_path.display(),
            imported = report.imported,
            skipped = report.skipped,
            "Legacy import complete"
        );
    }

    let config: EngineConfig = args.engine_config(|name| std::env::var(name).ok());
    let processor: HttpPaymentProcessor = HttpPaymentProcessor::new(
        &args.processor_base_url,
        &args.processor_token,
        &args.processor_location,
        args.external_timeout(),
    )?;
    let mailer: HttpMailer = HttpMailer::new(
        &args.mail_base_url,
        &args.mail_api_key,
        &args.mail_from,
        args.external_timeout(),
    )?;

    let engine: BookingEngine =
        BookingEngine::new(persistence, Arc::new(processor), Arc::new(mailer), config);
    let app: Router = build_router(AppState { engine });

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(%addr, "Server listening");

    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
