//! truncpad CLI
//!
//! Shrink or extend files to a given size, optionally filling new space
//! with an explicit byte.

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use truncpad_core::{RequestOptions, ResizeEngine, ResizeRequest, parse_pad_byte, size};

const SIZE_HELP: &str = "\
SIZE is an integer with an optional unit: K, M, G, T, P, E, Z, Y (powers of
1024) or KB, MB, ... (powers of 1000). KiB, MiB, ... are the same as K, M, ...

SIZE may be prefixed by one of the following modifying characters:
  +  extend by        -  reduce by
  <  at most          >  at least
  /  round down to multiple of
  %  round up to multiple of

CODE is a byte value in decimal, 0x-prefixed hexadecimal or 0-prefixed octal.
Without -C, space added to a file is left as a hole that reads back as zeros.";

/// truncpad - shrink or extend the size of each FILE to the specified size
///
/// A FILE argument that does not exist is created. If a FILE is larger than
/// the specified size, the extra data is lost. If a FILE is shorter, it is
/// extended and the extended part reads as zero bytes, or as CODE with -C.
#[derive(Parser, Debug)]
#[command(name = "truncpad")]
#[command(author, version, about, after_long_help = SIZE_HELP)]
#[command(disable_version_flag = true, args_override_self = true)]
struct Cli {
    /// Do not create any files
    #[arg(short = 'c', long)]
    no_create: bool,

    /// Treat SIZE as number of IO blocks instead of bytes
    #[arg(short = 'o', long)]
    io_blocks: bool,

    /// Base size on RFILE
    #[arg(short, long, value_name = "RFILE")]
    reference: Option<PathBuf>,

    /// Set or adjust the file size by SIZE bytes
    #[arg(short, long, value_name = "SIZE", allow_hyphen_values = true)]
    size: Option<String>,

    /// Fill extended space with byte CODE instead of leaving a hole
    #[arg(short = 'C', long, value_name = "CODE")]
    character: Option<String>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Enable debug output (implies --verbose)
    #[arg(long)]
    debug: bool,

    /// Files to resize
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }

    /// Parse the value-carrying options into unvalidated request options
    fn request_options(&self) -> anyhow::Result<RequestOptions> {
        let size = self
            .size
            .as_deref()
            .map(size::parse)
            .transpose()
            .context("invalid --size")?;
        let pad_byte = self.character.as_deref().map(parse_pad_byte).transpose()?;

        Ok(RequestOptions {
            size,
            reference: self.reference.clone(),
            block_mode: self.io_blocks,
            no_create: self.no_create,
            pad_byte,
        })
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Usage errors exit 1; help and version still exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            e.print()?;
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => e.exit(),
    };

    // Initialize logging; RUST_LOG wins over the flags
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = cli.request_options()?;
    options.validate()?;
    if cli.files.is_empty() {
        bail!("missing file operand");
    }

    let request = ResizeRequest::from_options(options)?;
    let engine = ResizeEngine::new(request);

    match engine.apply(&cli.files) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(errors) => {
            for err in &errors {
                eprintln!("truncpad: {err}");
            }
            tracing::debug!("{} of {} files failed", errors.len(), cli.files.len());
            Ok(ExitCode::FAILURE)
        }
    }
}
