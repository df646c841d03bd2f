//! Architect agent: writes the content block for a researched topic.

use tracing::{debug, instrument};

use crate::core::types::AgentFailure;
use crate::io::generator::TextGenerator;
use crate::io::prompt::PromptEngine;

use super::call;

pub struct ArchitectAgent {
    prompts: PromptEngine,
    language: String,
}

impl ArchitectAgent {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            prompts: PromptEngine::new(),
            language: language.into(),
        }
    }

    /// Ask for a code fragment on `topic` inspired by `identifier`.
    ///
    /// The reply is returned verbatim; an empty or whitespace-only reply is FAILED.
    #[instrument(skip_all, fields(topic = %topic, identifier = %identifier))]
    pub fn invoke<G: TextGenerator + ?Sized>(
        &self,
        generator: &G,
        topic: &str,
        identifier: &str,
    ) -> Result<String, AgentFailure> {
        let prompt = self
            .prompts
            .render_architect(topic, identifier, &self.language)
            .map_err(|err| AgentFailure::Prompt(format!("{err:#}")))?;
        let content = call(generator, &prompt)?;
        if content.trim().is_empty() {
            return Err(AgentFailure::Empty);
        }
        debug!(bytes = content.len(), "content generated");
        Ok(content)
    }
}
