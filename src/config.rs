use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Attendance dashboard sidecar: JSON-lines requests on stdin, replies on stdout.
#[derive(Debug, Clone, Parser)]
#[command(name = "attendlyd", version, about)]
pub struct Config {
    /// Seed dataset to load instead of the built-in fixtures
    #[arg(long, env = "ATTENDLY_SEED")]
    pub seed: Option<PathBuf>,

    /// API key for the text-generation service; summaries fall back to a static reply without one
    #[arg(long, env = "ATTENDLY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "ATTENDLY_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "ATTENDLY_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Log filter used when RUST_LOG is unset (logs go to stderr)
    #[arg(long, env = "ATTENDLY_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
