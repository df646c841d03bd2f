//! Round state machine.
//!
//! Each loop iteration walks `Planning -> Researching -> Generating ->
//! Integrating -> Planning`. A failed sub-agent diverts to `Cooldown`, which
//! always returns to `Planning` so the next attempt measures the artifact and
//! draws a fresh topic. `Done` is only reachable from `Planning`.
//!
//! The coordinator performs the side effects for the current phase and feeds
//! the result back as a [`Signal`]; [`Phase::advance`] decides what comes next.

use std::fmt;

use crate::core::types::{AgentFailure, Round};

/// Where the current round is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Measure the artifact and either stop or draw a topic.
    Planning,
    Researching {
        topic: String,
    },
    Generating {
        topic: String,
        identifier: String,
    },
    /// Both sub-agents succeeded; the round is waiting to be appended.
    Integrating(Round),
    /// A sub-agent failed; the round has been discarded.
    Cooldown,
    Done {
        final_size_bytes: u64,
    },
}

/// Outcome of the work performed in a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    GoalReached { size_bytes: u64 },
    TopicDrawn(String),
    Researched(Result<String, AgentFailure>),
    Generated(Result<String, AgentFailure>),
    /// The round was appended and the inter-round delay elapsed.
    Appended,
    /// The failure cooldown elapsed.
    Rested,
}

/// A signal arrived in a phase that cannot accept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub phase: &'static str,
    pub signal: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid transition: {} cannot accept {}",
            self.phase, self.signal
        )
    }
}

impl std::error::Error for InvalidTransition {}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Researching { .. } => "researching",
            Self::Generating { .. } => "generating",
            Self::Integrating(_) => "integrating",
            Self::Cooldown => "cooldown",
            Self::Done { .. } => "done",
        }
    }

    /// Consume the current phase and a signal, yielding the next phase.
    pub fn advance(self, signal: Signal) -> Result<Phase, InvalidTransition> {
        let next = match (self, signal) {
            (Self::Planning, Signal::GoalReached { size_bytes }) => Self::Done {
                final_size_bytes: size_bytes,
            },
            (Self::Planning, Signal::TopicDrawn(topic)) => Self::Researching { topic },
            (Self::Researching { topic }, Signal::Researched(Ok(identifier))) => {
                Self::Generating { topic, identifier }
            }
            (Self::Generating { topic, identifier }, Signal::Generated(Ok(content))) => {
                Self::Integrating(Round {
                    topic,
                    identifier,
                    content,
                })
            }
            (Self::Researching { .. }, Signal::Researched(Err(_)))
            | (Self::Generating { .. }, Signal::Generated(Err(_))) => Self::Cooldown,
            (Self::Integrating(_), Signal::Appended) | (Self::Cooldown, Signal::Rested) => {
                Self::Planning
            }
            (phase, signal) => {
                return Err(InvalidTransition {
                    phase: phase.name(),
                    signal: signal.name(),
                });
            }
        };
        Ok(next)
    }
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GoalReached { .. } => "goal_reached",
            Self::TopicDrawn(_) => "topic_drawn",
            Self::Researched(_) => "researched",
            Self::Generated(_) => "generated",
            Self::Appended => "appended",
            Self::Rested => "rested",
        }
    }
}
