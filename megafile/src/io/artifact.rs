//! The growing output file.
//!
//! The artifact is never read back. Its size on disk is the only progress
//! signal, and every round lands as exactly one append.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::core::record::{render_banner, render_record};
use crate::core::types::{BuildGoal, Round};

/// Handle to the artifact path plus the comment style used for headers.
#[derive(Debug, Clone)]
pub struct Artifact {
    path: PathBuf,
    comment_prefix: &'static str,
}

impl Artifact {
    /// Create (or truncate) the artifact and write the banner.
    #[instrument(skip_all, fields(path = %goal.artifact_path.display()))]
    pub fn create(
        goal: &BuildGoal,
        comment_prefix: &'static str,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        let path = goal.artifact_path.clone();
        ensure_parent(&path)?;
        let banner = render_banner(goal.target_bytes, started_at, comment_prefix);
        fs::write(&path, banner).with_context(|| format!("create artifact {}", path.display()))?;
        info!("artifact created");
        Ok(Self {
            path,
            comment_prefix,
        })
    }

    /// Reuse an existing artifact as-is, creating it with a banner if absent.
    #[instrument(skip_all, fields(path = %goal.artifact_path.display()))]
    pub fn resume(
        goal: &BuildGoal,
        comment_prefix: &'static str,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        if !goal.artifact_path.exists() {
            return Self::create(goal, comment_prefix, started_at);
        }
        let artifact = Self {
            path: goal.artifact_path.clone(),
            comment_prefix,
        };
        info!(size_bytes = artifact.size_bytes()?, "resuming artifact");
        Ok(artifact)
    }

    /// Current size from the filesystem.
    pub fn size_bytes(&self) -> Result<u64> {
        let meta =
            fs::metadata(&self.path).with_context(|| format!("stat {}", self.path.display()))?;
        Ok(meta.len())
    }

    /// Append one record with a single write call.
    ///
    /// The file is opened in append mode for each round and closed again, so
    /// an interrupted process leaves either the whole record or none of it.
    #[instrument(skip_all, fields(topic = %round.topic))]
    pub fn append(&self, round: &Round) -> Result<usize> {
        let record = render_record(round, self.comment_prefix);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {} for append", self.path.display()))?;
        let written = file
            .write(record.as_bytes())
            .with_context(|| format!("append to {}", self.path.display()))?;
        if written != record.len() {
            bail!(
                "short append to {}: wrote {written} of {} bytes",
                self.path.display(),
                record.len()
            );
        }
        debug!(bytes = written, "record appended");
        Ok(written)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}
