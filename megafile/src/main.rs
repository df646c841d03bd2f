//! Grow one file to a target size with generated code.
//!
//! Each round asks a researcher role for a reference identifier, asks an
//! architect role for a code fragment inspired by it, and appends the result.
//! Progress is measured from the file size on disk.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use megafile::coordinator::{LoopPlan, run_loop};
use megafile::exit_codes;
use megafile::io::config::{LoopConfig, load_config, write_config};
use megafile::io::console::ConsoleReporter;
use megafile::io::credential::{API_KEY_ENV, Prompt, resolve_credential};
use megafile::io::generator::HttpGenerator;
use megafile::io::sleep::ThreadSleeper;
use megafile::logging;

#[derive(Parser, Debug)]
#[command(
    name = "megafile",
    version,
    about = "Grow a file to a target size with generated code"
)]
struct Cli {
    /// TOML config file. A missing file means built-in defaults.
    #[arg(long, env = "MEGAFILE_CONFIG", default_value = "megafile.toml")]
    config: PathBuf,

    /// Stop once the output reaches this many MiB.
    #[arg(long, env = "MEGAFILE_TARGET_MB")]
    target_mb: Option<u64>,

    /// Output file to grow.
    #[arg(long, env = "MEGAFILE_OUTPUT")]
    output: Option<PathBuf>,

    /// Where the API key is cached after an interactive prompt.
    #[arg(long, env = "MEGAFILE_KEY_FILE")]
    key_file: Option<PathBuf>,

    /// Keep an existing output file instead of truncating it.
    #[arg(long)]
    resume: bool,

    /// Write the effective config to `--config` and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = apply_cli_overrides(load_config(&cli.config)?, &cli)?;

    if cli.write_config {
        write_config(&cli.config, &cfg)?;
        println!("wrote {}", cli.config.display());
        return Ok(());
    }

    let env_key = std::env::var(API_KEY_ENV).ok();
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut input = stdin.lock();
    let mut stderr = io::stderr();
    let prompt = if interactive {
        Some(Prompt {
            input: &mut input,
            output: &mut stderr,
        })
    } else {
        None
    };
    let (credential, source) = resolve_credential(env_key.as_deref(), &cfg.key_file, prompt)?;
    info!(?source, "credential resolved");

    let goal = cfg.build_goal()?;
    let catalog = cfg.catalog()?;
    let generator = HttpGenerator::new(&cfg.endpoint, credential, cfg.request_timeout())?;

    let plan = LoopPlan {
        goal: &goal,
        catalog: &catalog,
        timing: cfg.timing(),
        language: &cfg.language,
        resume: cfg.resume,
    };
    let mut reporter = ConsoleReporter::new(io::stdout().lock());
    run_loop(
        &plan,
        &generator,
        &ThreadSleeper,
        &mut rand::thread_rng(),
        |event| {
            if let Err(err) = reporter.report(event) {
                warn!(err = %err, "console write failed");
            }
        },
    )
    .with_context(|| format!("grow {}", goal.artifact_path.display()))?;
    Ok(())
}

/// Layer CLI flags and environment values over the file config.
fn apply_cli_overrides(mut cfg: LoopConfig, cli: &Cli) -> Result<LoopConfig> {
    if let Some(target_mb) = cli.target_mb {
        cfg.target_mb = target_mb;
    }
    if let Some(output) = &cli.output {
        cfg.output_path = output.clone();
    }
    if let Some(key_file) = &cli.key_file {
        cfg.key_file = key_file.clone();
    }
    if cli.resume {
        cfg.resume = true;
    }
    cfg.validate()?;
    Ok(cfg)
}
