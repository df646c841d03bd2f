//! Prompt rendering for the two sub-agent roles.

use anyhow::Result;
use minijinja::{Environment, context};

const RESEARCHER_TEMPLATE: &str = include_str!("prompts/researcher.md");
const ARCHITECT_TEMPLATE: &str = include_str!("prompts/architect.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("researcher", RESEARCHER_TEMPLATE)
            .expect("researcher template should be valid");
        env.add_template("architect", ARCHITECT_TEMPLATE)
            .expect("architect template should be valid");
        Self { env }
    }

    pub fn render_researcher(&self, topic: &str) -> Result<String> {
        let template = self.env.get_template("researcher")?;
        let rendered = template.render(context! {
            topic => topic.trim(),
        })?;
        Ok(rendered)
    }

    pub fn render_architect(
        &self,
        topic: &str,
        identifier: &str,
        language: &str,
    ) -> Result<String> {
        let template = self.env.get_template("architect")?;
        let rendered = template.render(context! {
            topic => topic.trim(),
            identifier => identifier.trim(),
            language => language.trim(),
        })?;
        Ok(rendered)
    }
}
