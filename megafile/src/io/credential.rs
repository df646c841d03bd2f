//! API credential resolution.
//!
//! Sources are tried in order: the `GEMINI_API_KEY` environment variable, the
//! cached key file, then an interactive prompt whose answer is cached for the
//! next run. The loop only ever sees a non-empty [`Credential`].

use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

/// Environment variable consulted first.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// A non-empty API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trim and accept the key if anything is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Which source produced the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Cache,
    Prompt,
}

/// No source produced a non-empty credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCredential;

impl fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing API key: set {API_KEY_ENV}, provide a key file, or run interactively"
        )
    }
}

impl std::error::Error for MissingCredential {}

/// Interactive input/output used when neither env nor cache has a key.
pub struct Prompt<'a> {
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
}

/// Resolve the credential.
///
/// `prompt` is `None` when stdin is not interactive; in that case a missing
/// key fails with [`MissingCredential`] without touching the cache file.
#[instrument(skip_all, fields(cache_path = %cache_path.display(), interactive = prompt.is_some()))]
pub fn resolve_credential(
    env_value: Option<&str>,
    cache_path: &Path,
    prompt: Option<Prompt<'_>>,
) -> Result<(Credential, CredentialSource)> {
    if let Some(credential) = env_value.and_then(Credential::parse) {
        debug!("credential from environment");
        return Ok((credential, CredentialSource::Environment));
    }

    if let Some(credential) = read_cached(cache_path)? {
        debug!("credential from cache file");
        return Ok((credential, CredentialSource::Cache));
    }

    let Some(prompt) = prompt else {
        warn!("no credential and no interactive input");
        return Err(MissingCredential.into());
    };

    write!(prompt.output, "Enter API key: ").context("write key prompt")?;
    prompt.output.flush().context("flush key prompt")?;
    let mut line = String::new();
    prompt
        .input
        .read_line(&mut line)
        .context("read API key from input")?;
    let credential = Credential::parse(&line).ok_or(MissingCredential)?;

    write_cached(cache_path, &credential)?;
    info!("credential cached");
    Ok((credential, CredentialSource::Prompt))
}

fn read_cached(path: &Path) -> Result<Option<Credential>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(Credential::parse(&contents))
}

/// Persist the key readable by the owner only.
fn write_cached(path: &Path, credential: &Credential) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", credential.expose()))
        .with_context(|| format!("write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("restrict permissions on {}", path.display()))?;
    }
    Ok(())
}
