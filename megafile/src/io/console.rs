//! Operator-facing output: a status line rewritten in place plus one line per
//! round event.

use std::io::{self, Write};

use crate::core::progress::{format_bytes, format_elapsed};
use crate::core::types::{LoopEvent, Progress};

/// Erase the current terminal line and return the cursor to column 0.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Single-line status: size, percent complete, elapsed time.
pub fn render_status(progress: &Progress) -> String {
    format!(
        "[{}] {} / {} ({:.1}%)",
        format_elapsed(progress.elapsed),
        format_bytes(progress.size_bytes),
        format_bytes(progress.target_bytes),
        progress.percent_of_target()
    )
}

/// One log line per event, without trailing newline.
pub fn render_event(event: &LoopEvent) -> String {
    match event {
        LoopEvent::Planning { topic } => format!("planning: {topic}"),
        LoopEvent::Researched { topic, identifier } => {
            format!("research result: {topic} -> {identifier}")
        }
        LoopEvent::Generated { topic, bytes } => {
            format!("generation result: {topic} ({bytes} bytes)")
        }
        LoopEvent::Integrated(progress) => format!(
            "integrated: artifact now {}",
            format_bytes(progress.size_bytes)
        ),
        LoopEvent::RoundFailed {
            role,
            failure,
            cooldown,
        } => format!(
            "{} failed: {failure}; cooling down {}s",
            role.as_str(),
            cooldown.as_secs()
        ),
        LoopEvent::Completed(report) => format!(
            "done: {} in {} ({} rounds integrated, {} failed)",
            format_bytes(report.final_size_bytes),
            format_elapsed(report.elapsed),
            report.rounds_integrated,
            report.rounds_failed
        ),
    }
}

/// Writes events to a terminal-like sink, keeping the latest status line
/// pinned below the event log.
pub struct ConsoleReporter<W: Write> {
    out: W,
    status: Option<String>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, status: None }
    }

    pub fn report(&mut self, event: &LoopEvent) -> io::Result<()> {
        if let LoopEvent::Integrated(progress) = event {
            self.status = Some(render_status(progress));
        }
        writeln!(self.out, "{CLEAR_LINE}{}", render_event(event))?;
        match (&self.status, event) {
            (_, LoopEvent::Completed(_)) | (None, _) => {}
            (Some(status), _) => write!(self.out, "{status}")?,
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AgentFailure, Role, TerminationReport};
    use std::time::Duration;

    fn progress(size_bytes: u64) -> Progress {
        Progress {
            size_bytes,
            target_bytes: 2048,
            elapsed: Duration::from_secs(65),
        }
    }

    #[test]
    fn status_shows_size_percent_and_elapsed() {
        assert_eq!(
            render_status(&progress(1024)),
            "[00:01:05] 1.0 KB / 2.0 KB (50.0%)"
        );
    }

    #[test]
    fn events_render_one_line_each() {
        let failed = LoopEvent::RoundFailed {
            role: Role::Researcher,
            failure: AgentFailure::Empty,
            cooldown: Duration::from_secs(10),
        };
        assert_eq!(
            render_event(&failed),
            "researcher failed: empty response; cooling down 10s"
        );
        assert_eq!(
            render_event(&LoopEvent::Planning {
                topic: "trie".to_string()
            }),
            "planning: trie"
        );
    }

    #[test]
    fn status_line_follows_events_until_completion() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter
            .report(&LoopEvent::Planning {
                topic: "trie".to_string(),
            })
            .expect("report");
        reporter
            .report(&LoopEvent::Integrated(progress(1024)))
            .expect("report");
        reporter
            .report(&LoopEvent::Completed(TerminationReport {
                final_size_bytes: 2048,
                elapsed: Duration::from_secs(70),
                rounds_integrated: 2,
                rounds_failed: 0,
            }))
            .expect("report");

        let out = String::from_utf8(reporter.into_inner()).expect("utf8");
        assert!(out.starts_with("\r\x1b[2Kplanning: trie\n"));
        assert!(out.contains("integrated: artifact now 1.0 KB\n[00:01:05]"));
        assert!(out.ends_with("done: 2.0 KB in 00:01:10 (2 rounds integrated, 0 failed)\n"));
    }
}
