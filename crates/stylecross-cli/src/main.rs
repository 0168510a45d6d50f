// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! stylecross CLI entrypoint.
//!
//! Converts a Mapbox GL style document into a Tangram scene file.
//!
//! # Usage
//! ```text
//! stylecross convert [INPUT] [-o OUTPUT] [--json] [--strict] [options]
//! stylecross prefs [--save] [options]
//! ```
//!
//! `INPUT` defaults to stdin and `OUTPUT` to stdout. Diagnostics are logged to
//! stderr; with `--strict` any diagnostic makes the exit code non-zero.

mod settings;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use stylecross_app_core::config::ConfigService;
use stylecross_app_core::pipeline::{self, OutputFormat};
use stylecross_config_fs::FsConfigStore;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::settings::PrefsArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Mapbox GL styles into Tangram scene YAML")]
struct Cli {
    /// More log output on stderr (repeatable). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Directory holding stored preferences (defaults to the platform config dir).
    #[arg(long, global = true, env = "STYLECROSS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
    /// JSON preferences file layered over the stored preferences.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a style document.
    Convert {
        /// Source style JSON (`-` or omitted for stdin).
        input: Option<PathBuf>,
        /// Write the scene here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit JSON instead of YAML.
        #[arg(long)]
        json: bool,
        /// Exit non-zero when the conversion reported diagnostics.
        #[arg(long)]
        strict: bool,
        #[command(flatten)]
        prefs: PrefsArgs,
    },
    /// Show the effective preferences, optionally saving them.
    Prefs {
        /// Persist the effective preferences to the config dir.
        #[arg(long)]
        save: bool,
        #[command(flatten)]
        prefs: PrefsArgs,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn store(config_dir: Option<&Path>) -> Result<FsConfigStore> {
    match config_dir {
        Some(dir) => Ok(FsConfigStore::at(dir)),
        None => FsConfigStore::new().context("resolve config dir"),
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("read stdin")?;
            Ok(text)
        }
    }
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{text}\n")).with_context(|| format!("write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{text}").context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let service = ConfigService::new(store(cli.config_dir.as_deref())?);

    match cli.cmd {
        Command::Convert { input, output, json, strict, prefs } => {
            let prefs = settings::resolve(&service, cli.config.as_deref(), &prefs)?;
            debug!(?prefs, "effective preferences");

            let text = read_input(input.as_deref())?;
            let style: Value = serde_json::from_str(&text).context("parse style JSON")?;
            let format = if json { OutputFormat::Json } else { OutputFormat::Yaml };
            let rendered = pipeline::render(&style, &prefs, format).context("convert style")?;
            write_output(output.as_deref(), &rendered.text)?;

            let count = rendered.diagnostics.len();
            info!(diagnostics = count, "conversion finished");
            if strict && count > 0 {
                bail!("{count} diagnostic(s) reported");
            }
        }
        Command::Prefs { save, prefs } => {
            let prefs = settings::resolve(&service, cli.config.as_deref(), &prefs)?;
            if save {
                service.save_prefs(&prefs).context("save preferences")?;
                info!(path = %service_path(&service), "preferences saved");
            }
            let text = serde_json::to_string_pretty(&prefs).context("serialize preferences")?;
            write_output(None, &text)?;
        }
    }
    Ok(())
}

fn service_path(service: &ConfigService<FsConfigStore>) -> String {
    service
        .store()
        .path_for(stylecross_app_core::prefs::PREFS_KEY)
        .display()
        .to_string()
}
