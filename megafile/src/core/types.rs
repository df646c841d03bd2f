//! Shared types for the round protocol.
//!
//! These types define stable contracts between the coordinator, the
//! sub-agents and the console. They hold no handles and perform no I/O.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// What the loop is building and when it is done.
///
/// Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildGoal {
    pub target_bytes: u64,
    pub artifact_path: PathBuf,
}

impl BuildGoal {
    pub fn new(target_bytes: u64, artifact_path: impl Into<PathBuf>) -> Result<Self> {
        if target_bytes == 0 {
            bail!("target_bytes must be > 0");
        }
        Ok(Self {
            target_bytes,
            artifact_path: artifact_path.into(),
        })
    }

    /// Build a goal from a size in MiB, the unit operators configure.
    pub fn from_megabytes(target_mb: u64, artifact_path: impl Into<PathBuf>) -> Result<Self> {
        let Some(target_bytes) = target_mb.checked_mul(BYTES_PER_MB) else {
            bail!("target of {target_mb} MB overflows");
        };
        Self::new(target_bytes, artifact_path)
    }
}

/// One completed round, ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub topic: String,
    pub identifier: String,
    pub content: String,
}

/// Sub-agent roles invoked each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Researcher,
    Architect,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Researcher => "researcher",
            Self::Architect => "architect",
        }
    }
}

/// Why a sub-agent invocation produced no usable value.
///
/// This is the FAILED signal of the round protocol: it is returned to the
/// coordinator as a value and never aborts the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentFailure {
    /// The prompt could not be rendered.
    Prompt(String),
    /// The generation call failed (network, HTTP status, timeout).
    Transport(String),
    /// The call returned nothing usable after post-processing.
    Empty,
}

impl fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt(msg) => write!(f, "prompt rendering failed: {msg}"),
            Self::Transport(msg) => write!(f, "generation call failed: {msg}"),
            Self::Empty => f.write_str("empty response"),
        }
    }
}

impl std::error::Error for AgentFailure {}

/// Snapshot reported after each integrated round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub size_bytes: u64,
    pub target_bytes: u64,
    pub elapsed: Duration,
}

impl Progress {
    pub fn percent_of_target(&self) -> f64 {
        crate::core::progress::percent(self.size_bytes, self.target_bytes)
    }
}

/// Summary returned when the artifact reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationReport {
    pub final_size_bytes: u64,
    pub elapsed: Duration,
    /// Rounds whose record was appended during this run.
    pub rounds_integrated: u32,
    /// Rounds dropped because a sub-agent failed.
    pub rounds_failed: u32,
}

/// Observation emitted by the coordinator as a round moves along.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// A topic was drawn for the next round.
    Planning { topic: String },
    Researched { topic: String, identifier: String },
    Generated { topic: String, bytes: usize },
    /// A record was appended; carries the re-measured size.
    Integrated(Progress),
    /// A sub-agent failed and the round was dropped.
    RoundFailed {
        role: Role,
        failure: AgentFailure,
        cooldown: Duration,
    },
    Completed(TerminationReport),
}
