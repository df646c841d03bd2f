//! Researcher agent: maps a topic to one reference identifier.

use tracing::{debug, instrument};

use crate::core::types::AgentFailure;
use crate::io::generator::TextGenerator;
use crate::io::prompt::PromptEngine;

use super::call;

#[derive(Default)]
pub struct ResearcherAgent {
    prompts: PromptEngine,
}

impl ResearcherAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for the identifier of `topic`.
    ///
    /// All whitespace is stripped from the reply; nothing left means FAILED.
    #[instrument(skip_all, fields(topic = %topic))]
    pub fn invoke<G: TextGenerator + ?Sized>(
        &self,
        generator: &G,
        topic: &str,
    ) -> Result<String, AgentFailure> {
        let prompt = self
            .prompts
            .render_researcher(topic)
            .map_err(|err| AgentFailure::Prompt(format!("{err:#}")))?;
        let raw = call(generator, &prompt)?;
        let identifier = strip_whitespace(&raw);
        if identifier.is_empty() {
            return Err(AgentFailure::Empty);
        }
        debug!(identifier = %identifier, "identifier resolved");
        Ok(identifier)
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
