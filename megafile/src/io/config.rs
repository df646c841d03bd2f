//! Loop configuration stored in `megafile.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::catalog::{TopicCatalog, default_topics};
use crate::core::types::BuildGoal;

/// Default `generateContent` endpoint for the text-generation transport.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Loop configuration (TOML).
///
/// Every field is optional in the file; missing fields default to the values
/// below. Environment variables and CLI flags override the file (see `main`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoopConfig {
    /// Stop once the artifact reaches this many MiB.
    pub target_mb: u64,

    /// Artifact path.
    pub output_path: PathBuf,

    /// Where the credential is cached after an interactive prompt.
    pub key_file: PathBuf,

    /// Throttle between successful rounds.
    pub round_delay_secs: u64,

    /// Pause after a failed round before retrying.
    pub cooldown_secs: u64,

    /// Upper bound on a single generation call.
    pub request_timeout_secs: u64,

    pub endpoint: String,

    /// Language the Architect is asked to write.
    pub language: String,

    pub topics: Vec<String>,

    /// Keep an existing artifact and count its size toward the goal instead of
    /// truncating it.
    pub resume: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_mb: 5,
            output_path: PathBuf::from("megafile_output.py"),
            key_file: PathBuf::from(".megafile_key"),
            round_delay_secs: 2,
            cooldown_secs: 10,
            request_timeout_secs: 120,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "Python".to_string(),
            topics: default_topics(),
            resume: false,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_mb == 0 {
            return Err(anyhow!("target_mb must be > 0"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(anyhow!("output_path must not be empty"));
        }
        if self.key_file.as_os_str().is_empty() {
            return Err(anyhow!("key_file must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.cooldown_secs < self.round_delay_secs {
            return Err(anyhow!(
                "cooldown_secs ({}) must be >= round_delay_secs ({})",
                self.cooldown_secs,
                self.round_delay_secs
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(anyhow!("endpoint must not be empty"));
        }
        if self.language.trim().is_empty() {
            return Err(anyhow!("language must not be empty"));
        }
        TopicCatalog::new(self.topics.clone()).context("topics")?;
        Ok(())
    }

    pub fn build_goal(&self) -> Result<BuildGoal> {
        BuildGoal::from_megabytes(self.target_mb, &self.output_path)
    }

    pub fn catalog(&self) -> Result<TopicCatalog> {
        TopicCatalog::new(self.topics.clone())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            round_delay: Duration::from_secs(self.round_delay_secs),
            cooldown: Duration::from_secs(self.cooldown_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Fixed delays applied by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// After a successful round.
    pub round_delay: Duration,
    /// After a failed round.
    pub cooldown: Duration,
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LoopConfig::default()`. The result is not
/// validated; callers validate after layering overrides on top.
pub fn load_config(path: &Path) -> Result<LoopConfig> {
    if !path.exists() {
        return Ok(LoopConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LoopConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &LoopConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, LoopConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("megafile.toml");
        let cfg = LoopConfig {
            target_mb: 12,
            language: "Rust".to_string(),
            topics: vec!["trie".to_string()],
            ..LoopConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("megafile.toml");
        fs::write(&path, "target_mb = 3\nresume = true\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.target_mb, 3);
        assert!(cfg.resume);
        assert_eq!(cfg.cooldown_secs, LoopConfig::default().cooldown_secs);
    }

    #[test]
    fn load_leaves_validation_to_caller() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("megafile.toml");
        fs::write(&path, "target_mb = 0\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.target_mb, 0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_cooldown_shorter_than_round_delay() {
        let cfg = LoopConfig {
            round_delay_secs: 5,
            cooldown_secs: 1,
            ..LoopConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("cooldown_secs"));
    }

    #[test]
    fn rejects_empty_topics() {
        let cfg = LoopConfig {
            topics: Vec::new(),
            ..LoopConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("must not be empty"));
    }

    #[test]
    fn build_goal_converts_megabytes() {
        let cfg = LoopConfig {
            target_mb: 1,
            ..LoopConfig::default()
        };
        let goal = cfg.build_goal().expect("goal");
        assert_eq!(goal.target_bytes, 1024 * 1024);
        assert_eq!(goal.artifact_path, cfg.output_path);
    }
}
