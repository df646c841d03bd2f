//! Sub-agent roles invoked once per round.
//!
//! Both roles are stateless wrappers over a [`TextGenerator`]: they render a
//! prompt, make one call, and post-process the reply. Every failure comes back
//! as an [`AgentFailure`] value; retry policy belongs to the coordinator.

use tracing::warn;

use crate::core::types::AgentFailure;
use crate::io::generator::TextGenerator;

pub mod architect;
pub mod researcher;

/// Make one generation call, folding any error into the FAILED signal.
pub(crate) fn call<G: TextGenerator + ?Sized>(
    generator: &G,
    prompt: &str,
) -> Result<String, AgentFailure> {
    generator.generate(prompt).map_err(|err| {
        warn!(err = %format!("{err:#}"), "generation call failed");
        AgentFailure::Transport(format!("{err:#}"))
    })
}
