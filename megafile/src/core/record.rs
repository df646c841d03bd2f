//! Text layout of the artifact: one banner, then one record per round.
//!
//! Records are rendered to a single buffer so the artifact writer can append
//! each round with one write call.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::types::Round;

const HASH_COMMENT_LANGUAGES: &[&str] = &[
    "python", "ruby", "perl", "shell", "bash", "sh", "r", "julia", "elixir", "nim", "toml",
    "yaml",
];

/// Line-comment prefix for the configured output language.
pub fn comment_prefix(language: &str) -> &'static str {
    let lang = language.trim().to_ascii_lowercase();
    if HASH_COMMENT_LANGUAGES.contains(&lang.as_str()) {
        "#"
    } else {
        "//"
    }
}

/// Banner written once when the artifact is created.
pub fn render_banner(target_bytes: u64, started_at: DateTime<Utc>, prefix: &str) -> String {
    format!(
        "{prefix} megafile: growing this file to {target_bytes} bytes\n\
         {prefix} started: {}\n\n",
        started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// A complete record for one round: comment header, content, blank line.
pub fn render_record(round: &Round, prefix: &str) -> String {
    let mut buf = String::with_capacity(round.content.len() + 64);
    buf.push_str(&format!("{prefix} topic: {}\n", round.topic));
    buf.push_str(&format!("{prefix} inspiration: {}\n", round.identifier));
    buf.push_str(&round.content);
    if !round.content.ends_with('\n') {
        buf.push('\n');
    }
    buf.push('\n');
    buf
}
