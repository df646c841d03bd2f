//! Loop-level harness tests for full growth runs.
//!
//! These tests drive `run_loop` against scripted generators and a recording
//! sleeper to verify termination, monotonic growth, all-or-nothing rounds and
//! the retry policy.

use std::collections::BTreeSet;
use std::fs;
use std::time::Duration;

use megafile::coordinator::{LoopPlan, run_loop};
use megafile::core::catalog::TopicCatalog;
use megafile::core::types::{AgentFailure, BuildGoal, LoopEvent, Role, TerminationReport};
use megafile::io::config::Timing;
use megafile::io::generator::TextGenerator;
use megafile::test_support::{RecordingSleeper, RoleStub, ScriptedGenerator, seeded_rng, temp_goal};

const ROUND_DELAY: Duration = Duration::from_secs(2);
const COOLDOWN: Duration = Duration::from_secs(10);

fn catalog(topics: &[&str]) -> TopicCatalog {
    TopicCatalog::new(topics.iter().map(|t| (*t).to_string()).collect()).expect("catalog")
}

fn run<G: TextGenerator>(
    goal: &BuildGoal,
    catalog: &TopicCatalog,
    generator: &G,
    sleeper: &RecordingSleeper,
    events: &mut Vec<LoopEvent>,
) -> TerminationReport {
    run_loop(
        &LoopPlan {
            goal,
            catalog,
            timing: Timing {
                round_delay: ROUND_DELAY,
                cooldown: COOLDOWN,
            },
            language: "Python",
            resume: false,
        },
        generator,
        sleeper,
        &mut seeded_rng(17),
        |event| events.push(event.clone()),
    )
    .expect("loop")
}

/// Artifact text after the banner (the banner carries a timestamp).
fn body(goal: &BuildGoal) -> String {
    let contents = fs::read_to_string(&goal.artifact_path).expect("read artifact");
    let (_, rest) = contents.split_once("\n\n").expect("banner terminator");
    rest.to_string()
}

/// Target 1 KB, one topic, 400-byte fragments: banner + 2 records stays under
/// 1024 bytes, the third record crosses it.
#[test]
fn one_kilobyte_goal_takes_exactly_three_rounds() {
    let (_temp, goal) = temp_goal(1024);
    let generator = RoleStub::new("ID1", &"a".repeat(400));
    let sleeper = RecordingSleeper::default();
    let mut events = Vec::new();

    let report = run(&goal, &catalog(&["A"]), &generator, &sleeper, &mut events);

    assert_eq!(report.rounds_integrated, 3);
    assert_eq!(report.rounds_failed, 0);
    assert!(report.final_size_bytes >= 1024);
    assert_eq!(
        report.final_size_bytes,
        fs::metadata(&goal.artifact_path).expect("stat").len()
    );
    assert_eq!(generator.research_calls(), 3);
    assert_eq!(generator.architect_calls(), 3);
    assert_eq!(sleeper.sleeps(), vec![ROUND_DELAY; 3]);
    assert!(matches!(events.last(), Some(LoopEvent::Completed(r)) if *r == report));

    let body = body(&goal);
    assert_eq!(body.matches("# topic: A\n# inspiration: ID1\n").count(), 3);
}

#[test]
fn always_succeeding_stub_reaches_every_target() {
    for target in [1, 100, 1024, 4096, 10_000] {
        let (_temp, goal) = temp_goal(target);
        let generator = RoleStub::new("Knuth1968", "x = 1\n");
        let sleeper = RecordingSleeper::default();
        let mut events = Vec::new();

        let report = run(
            &goal,
            &catalog(&["a", "b", "c"]),
            &generator,
            &sleeper,
            &mut events,
        );

        assert!(
            report.final_size_bytes >= target,
            "target {target} ended at {}",
            report.final_size_bytes
        );
        assert_eq!(u32::try_from(sleeper.sleeps().len()).expect("count"), report.rounds_integrated);
    }
}

#[test]
fn artifact_size_never_shrinks() {
    let (_temp, goal) = temp_goal(5_000);
    let generator = RoleStub::new("ID", &"b".repeat(120));
    let sleeper = RecordingSleeper::default();
    let mut events = Vec::new();

    run(&goal, &catalog(&["a", "b"]), &generator, &sleeper, &mut events);

    let sizes: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            LoopEvent::Integrated(progress) => Some(progress.size_bytes),
            _ => None,
        })
        .collect();
    assert!(sizes.len() > 1);
    assert!(sizes.windows(2).all(|pair| pair[0] < pair[1]), "{sizes:?}");
}

/// A failed round leaves the artifact byte-for-byte identical to a run in
/// which that round never happened.
#[test]
fn failed_round_leaves_no_partial_record() {
    let content_1 = "first = 1\n".repeat(20);
    let content_2 = "second = 2\n".repeat(20);

    let (_temp_a, goal_a) = temp_goal(400);
    let with_failure = ScriptedGenerator::replies(&[
        Ok("ID1"),
        Ok(content_1.as_str()),
        Ok("ID-broken"),
        Err("upstream 503"),
        Ok("ID2"),
        Ok(content_2.as_str()),
    ]);
    let sleeper_a = RecordingSleeper::default();
    let report_a = run(
        &goal_a,
        &catalog(&["A"]),
        &with_failure,
        &sleeper_a,
        &mut Vec::new(),
    );

    let (_temp_b, goal_b) = temp_goal(400);
    let without_failure = ScriptedGenerator::replies(&[
        Ok("ID1"),
        Ok(content_1.as_str()),
        Ok("ID2"),
        Ok(content_2.as_str()),
    ]);
    let sleeper_b = RecordingSleeper::default();
    let report_b = run(
        &goal_b,
        &catalog(&["A"]),
        &without_failure,
        &sleeper_b,
        &mut Vec::new(),
    );

    assert_eq!(with_failure.remaining(), 0);
    assert_eq!(without_failure.remaining(), 0);
    assert_eq!(report_a.rounds_failed, 1);
    assert_eq!(report_a.rounds_integrated, report_b.rounds_integrated);
    assert_eq!(report_a.final_size_bytes, report_b.final_size_bytes);
    assert_eq!(body(&goal_a), body(&goal_b));
    assert!(!body(&goal_a).contains("ID-broken"));
    assert_eq!(sleeper_a.sleeps(), vec![ROUND_DELAY, COOLDOWN, ROUND_DELAY]);
}

/// Researcher fails once, then succeeds for the same topic: one cooldown, no
/// growth from the failure, one record afterwards.
#[test]
fn researcher_failure_then_success_appends_once() {
    let (_temp, goal) = temp_goal(200);
    let content = "c".repeat(300);
    let generator =
        ScriptedGenerator::replies(&[Err("connection reset"), Ok("ID1"), Ok(content.as_str())]);
    let sleeper = RecordingSleeper::default();
    let path = goal.artifact_path.clone();
    let mut size_at_failure = None;
    let mut banner_size = None;

    let report = run_loop(
        &LoopPlan {
            goal: &goal,
            catalog: &catalog(&["A"]),
            timing: Timing {
                round_delay: ROUND_DELAY,
                cooldown: COOLDOWN,
            },
            language: "Python",
            resume: false,
        },
        &generator,
        &sleeper,
        &mut seeded_rng(5),
        |event| {
            let size = fs::metadata(&path).expect("stat").len();
            match event {
                LoopEvent::Planning { .. } if banner_size.is_none() => banner_size = Some(size),
                LoopEvent::RoundFailed { role, failure, .. } => {
                    assert_eq!(*role, Role::Researcher);
                    assert!(matches!(failure, AgentFailure::Transport(_)));
                    size_at_failure = Some(size);
                }
                _ => {}
            }
        },
    )
    .expect("loop");

    assert_eq!(size_at_failure, banner_size);
    assert_eq!(report.rounds_failed, 1);
    assert_eq!(report.rounds_integrated, 1);
    assert_eq!(sleeper.sleeps(), vec![COOLDOWN, ROUND_DELAY]);

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(prompts[0], prompts[1]);
    assert_eq!(body(&goal).matches("# topic: ").count(), 1);
}

#[test]
fn many_rounds_draw_more_than_one_topic() {
    let (_temp, goal) = temp_goal(20_000);
    let generator = RoleStub::new("ID", &"d".repeat(150));
    let sleeper = RecordingSleeper::default();
    let mut events = Vec::new();

    let report = run(
        &goal,
        &catalog(&["a", "b", "c", "d"]),
        &generator,
        &sleeper,
        &mut events,
    );

    let topics: BTreeSet<String> = events
        .iter()
        .filter_map(|event| match event {
            LoopEvent::Planning { topic } => Some(topic.clone()),
            _ => None,
        })
        .collect();
    assert!(report.rounds_integrated > 50);
    assert!(topics.len() > 1, "only drew {topics:?}");
}

#[test]
fn resume_counts_existing_bytes_toward_goal() {
    let (_temp, goal) = temp_goal(1_000);
    fs::write(&goal.artifact_path, "z".repeat(1_500)).expect("seed artifact");
    let generator = ScriptedGenerator::new(Vec::new());
    let sleeper = RecordingSleeper::default();

    let report = run_loop(
        &LoopPlan {
            goal: &goal,
            catalog: &catalog(&["A"]),
            timing: Timing {
                round_delay: ROUND_DELAY,
                cooldown: COOLDOWN,
            },
            language: "Python",
            resume: true,
        },
        &generator,
        &sleeper,
        &mut seeded_rng(1),
        |_| {},
    )
    .expect("loop");

    assert_eq!(report.final_size_bytes, 1_500);
    assert_eq!(report.rounds_integrated, 0);
    assert_eq!(generator.calls(), 0);
}
