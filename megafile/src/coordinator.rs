//! The control loop: measure, plan, research, generate, integrate.

use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::agents::architect::ArchitectAgent;
use crate::agents::researcher::ResearcherAgent;
use crate::core::catalog::TopicCatalog;
use crate::core::machine::{Phase, Signal};
use crate::core::record::comment_prefix;
use crate::core::types::{BuildGoal, LoopEvent, Progress, Role, TerminationReport};
use crate::io::artifact::Artifact;
use crate::io::config::Timing;
use crate::io::generator::TextGenerator;
use crate::io::sleep::Sleeper;

/// Fixed inputs of one run.
#[derive(Debug, Clone)]
pub struct LoopPlan<'a> {
    pub goal: &'a BuildGoal,
    pub catalog: &'a TopicCatalog,
    pub timing: Timing,
    /// Language requested from the Architect; also picks the comment style.
    pub language: &'a str,
    /// Keep an existing artifact instead of truncating it.
    pub resume: bool,
}

/// Grow the artifact until it reaches `plan.goal.target_bytes`.
///
/// The size is re-read from disk at the top of every iteration, so the goal
/// check also runs before any generation call. A failed sub-agent drops the
/// round, sleeps the cooldown and starts over with a fresh topic. Artifact I/O
/// errors stop the loop immediately.
#[instrument(
    skip_all,
    fields(
        target_bytes = plan.goal.target_bytes,
        path = %plan.goal.artifact_path.display(),
    )
)]
pub fn run_loop<G, S, R, F>(
    plan: &LoopPlan<'_>,
    generator: &G,
    sleeper: &S,
    rng: &mut R,
    mut on_event: F,
) -> Result<TerminationReport>
where
    G: TextGenerator + ?Sized,
    S: Sleeper + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&LoopEvent),
{
    let started = Instant::now();
    let prefix = comment_prefix(plan.language);
    let artifact = if plan.resume {
        Artifact::resume(plan.goal, prefix, Utc::now())?
    } else {
        Artifact::create(plan.goal, prefix, Utc::now())?
    };
    let researcher = ResearcherAgent::new();
    let architect = ArchitectAgent::new(plan.language);

    let mut rounds_integrated = 0u32;
    let mut rounds_failed = 0u32;
    let mut phase = Phase::Planning;

    loop {
        let signal = match &phase {
            Phase::Planning => {
                let size_bytes = artifact.size_bytes()?;
                if size_bytes >= plan.goal.target_bytes {
                    Signal::GoalReached { size_bytes }
                } else {
                    let topic = plan.catalog.draw(rng).to_string();
                    debug!(size_bytes, topic = %topic, "round planned");
                    on_event(&LoopEvent::Planning {
                        topic: topic.clone(),
                    });
                    Signal::TopicDrawn(topic)
                }
            }
            Phase::Researching { topic } => {
                let result = researcher.invoke(generator, topic);
                match &result {
                    Ok(identifier) => on_event(&LoopEvent::Researched {
                        topic: topic.clone(),
                        identifier: identifier.clone(),
                    }),
                    Err(failure) => {
                        rounds_failed += 1;
                        warn!(role = Role::Researcher.as_str(), %failure, "round dropped");
                        on_event(&LoopEvent::RoundFailed {
                            role: Role::Researcher,
                            failure: failure.clone(),
                            cooldown: plan.timing.cooldown,
                        });
                    }
                }
                Signal::Researched(result)
            }
            Phase::Generating { topic, identifier } => {
                let result = architect.invoke(generator, topic, identifier);
                match &result {
                    Ok(content) => on_event(&LoopEvent::Generated {
                        topic: topic.clone(),
                        bytes: content.len(),
                    }),
                    Err(failure) => {
                        rounds_failed += 1;
                        warn!(role = Role::Architect.as_str(), %failure, "round dropped");
                        on_event(&LoopEvent::RoundFailed {
                            role: Role::Architect,
                            failure: failure.clone(),
                            cooldown: plan.timing.cooldown,
                        });
                    }
                }
                Signal::Generated(result)
            }
            Phase::Integrating(round) => {
                artifact.append(round)?;
                rounds_integrated += 1;
                let progress = Progress {
                    size_bytes: artifact.size_bytes()?,
                    target_bytes: plan.goal.target_bytes,
                    elapsed: started.elapsed(),
                };
                info!(
                    size_bytes = progress.size_bytes,
                    rounds_integrated, "round integrated"
                );
                on_event(&LoopEvent::Integrated(progress));
                sleeper.sleep(plan.timing.round_delay);
                Signal::Appended
            }
            Phase::Cooldown => {
                sleeper.sleep(plan.timing.cooldown);
                Signal::Rested
            }
            Phase::Done { final_size_bytes } => {
                let report = TerminationReport {
                    final_size_bytes: *final_size_bytes,
                    elapsed: started.elapsed(),
                    rounds_integrated,
                    rounds_failed,
                };
                info!(
                    final_size_bytes,
                    rounds_integrated, rounds_failed, "goal reached"
                );
                on_event(&LoopEvent::Completed(report));
                return Ok(report);
            }
        };

        phase = phase.advance(signal)?;
    }
}
