mod calc;
mod config;
mod fixtures;
mod ipc;
mod model;
mod store;
mod summary;

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn build_generator(cfg: &config::Config) -> Box<dyn summary::SummaryGenerator> {
    let Some(key) = cfg.api_key() else {
        return Box::new(summary::Disabled);
    };
    match summary::GeminiClient::new(&cfg.api_base, &cfg.model, key) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "text generation client unavailable; using fallbacks");
            Box::new(summary::Disabled)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cfg = config::Config::parse();
    init_tracing(&cfg.log_level);

    let seed = fixtures::load_seed(cfg.seed.as_deref()).context("loading seed data")?;
    tracing::info!(
        students = seed.students.len(),
        subjects = seed.subjects.len(),
        sessions = seed.sessions.len(),
        "seed loaded"
    );

    let generator = build_generator(&cfg);
    tracing::info!(generator = generator.kind(), model = %cfg.model, "attendlyd ready");
    let mut state = ipc::AppState::new(store::Store::from_seed(seed), generator);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed request");
                ipc::bad_json(e.to_string())
            }
        };
        writeln!(stdout, "{}", resp).context("writing response")?;
        stdout.flush().context("flushing response")?;
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
