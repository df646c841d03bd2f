//! Test-only doubles for the generator and sleeper seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

use crate::core::types::BuildGoal;
use crate::io::generator::TextGenerator;
use crate::io::sleep::Sleeper;

/// Marker present only in researcher prompts.
const RESEARCHER_MARKER: &str = "Researcher Contract";

/// One queued generator reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
}

/// Generator that replays a fixed queue of replies in call order.
///
/// Panics when the queue runs dry so a runaway loop fails the test instead of
/// spinning through cooldowns.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: RefCell<VecDeque<ScriptedReply>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Build from `Ok(text)` / `Err(message)` pairs.
    pub fn replies(replies: &[Result<&str, &str>]) -> Self {
        Self::new(
            replies
                .iter()
                .map(|reply| match reply {
                    Ok(text) => ScriptedReply::Text((*text).to_string()),
                    Err(msg) => ScriptedReply::Fail((*msg).to_string()),
                })
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(msg)) => Err(anyhow!(msg)),
            None => panic!(
                "scripted generator exhausted after {} calls",
                self.prompts.borrow().len()
            ),
        }
    }
}

/// Generator that always succeeds, answering by role.
#[derive(Debug)]
pub struct RoleStub {
    identifier: String,
    content: String,
    research_calls: Cell<u32>,
    architect_calls: Cell<u32>,
}

impl RoleStub {
    pub fn new(identifier: &str, content: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            content: content.to_string(),
            research_calls: Cell::new(0),
            architect_calls: Cell::new(0),
        }
    }

    pub fn research_calls(&self) -> u32 {
        self.research_calls.get()
    }

    pub fn architect_calls(&self) -> u32 {
        self.architect_calls.get()
    }
}

impl TextGenerator for RoleStub {
    fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains(RESEARCHER_MARKER) {
            self.research_calls.set(self.research_calls.get() + 1);
            Ok(self.identifier.clone())
        } else {
            self.architect_calls.set(self.architect_calls.get() + 1);
            Ok(self.content.clone())
        }
    }
}

/// Sleeper that records requested durations and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Deterministic RNG for topic draws.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Goal pointing at `out.py` inside a fresh temp dir (keep the dir alive).
pub fn temp_goal(target_bytes: u64) -> (TempDir, BuildGoal) {
    let temp = tempfile::tempdir().expect("tempdir");
    let goal = BuildGoal::new(target_bytes, temp.path().join("out.py")).expect("goal");
    (temp, goal)
}
