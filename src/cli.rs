//! CLI argument parsing and command execution, exported from the library so
//! integration tests can exercise it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::analyzer;
use crate::error::{Error, SerialError};
use crate::ir::module::ModuleExpr;
use crate::ir::printer::emit_module_text;
use crate::ir::serial::{module_from_json, module_to_json};

/// Fully-parsed CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "schedule-ir")]
#[command(about = "Inspect and transform loop-schedule IR modules", long_about = None)]
pub struct CliArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write output to this file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print the module as text
    Dump { path: PathBuf },
    /// List the names of all schedule blocks
    Blocks { path: PathBuf },
    /// List the loops enclosing a block, outermost first
    Loops { path: PathBuf, block: String },
    /// List the blocks that read what a block writes
    Consumers { path: PathBuf, block: String },
    /// Infer the read and write buffer ranges of a block
    Buffers { path: PathBuf, block: String },
    /// Report whether a block is a reduction or a broadcast
    Classify { path: PathBuf, block: String },
    /// Wrap a block in a unit loop and print the rewritten module as JSON
    UnitLoop { path: PathBuf, block: String },
}

impl Command {
    pub fn path(&self) -> &Path {
        match self {
            Command::Dump { path }
            | Command::Blocks { path }
            | Command::Loops { path, .. }
            | Command::Consumers { path, .. }
            | Command::Buffers { path, .. }
            | Command::Classify { path, .. }
            | Command::UnitLoop { path, .. } => path,
        }
    }
}

/// Result of `parse_args`.
#[derive(Debug)]
pub enum ParseArgsResult {
    /// A command to run.
    Args(CliArgs),
    /// `--help` or `--version` was present; caller should print the text and
    /// exit 0.
    Help(String),
}

/// Parses command-line arguments (the full `std::env::args()` slice including `argv[0]`).
pub fn parse_args(args: &[String]) -> Result<ParseArgsResult, String> {
    match CliArgs::try_parse_from(args) {
        Ok(cli) => Ok(ParseArgsResult::Args(cli)),
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                Ok(ParseArgsResult::Help(e.to_string()))
            }
            _ => Err(e.to_string()),
        },
    }
}

/// Reads and parses a module document from disk.
pub fn load_module(path: &Path) -> Result<ModuleExpr, Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(module_from_json(&text)?)
}

/// Runs `command` and returns the text it prints.
pub fn run_command(command: &Command) -> Result<String, Error> {
    let mut module = load_module(command.path())?;
    let mut out = String::new();
    match command {
        Command::Dump { .. } => {
            out = emit_module_text(&module).map_err(SerialError::from)?;
        }
        Command::Blocks { .. } => {
            for block in analyzer::get_all_blocks(&module)? {
                line(&mut out, analyzer::get_block_name(&module, block)?)?;
            }
        }
        Command::Loops { block, .. } => {
            for for_id in analyzer::get_loops_by_name(&module, block)? {
                if let Some(f) = module.node(for_id).as_for() {
                    line(
                        &mut out,
                        format_args!(
                            "{} for ({}, {}, {})",
                            f.for_type,
                            f.loop_var,
                            module.display(f.min),
                            module.display(f.extent)
                        ),
                    )?;
                }
            }
        }
        Command::Consumers { block, .. } => {
            let block = analyzer::get_block(&module, block)?;
            let root = analyzer::get_root_block(&module, block)?;
            for consumer in analyzer::get_consumer_sblocks(&module, block, root)? {
                line(&mut out, analyzer::get_block_name(&module, consumer)?)?;
            }
        }
        Command::Buffers { block, .. } => {
            let block = analyzer::get_block(&module, block)?;
            let sblock = match module.node(block).as_realize() {
                Some(realize) => realize.schedule_block,
                None => {
                    let err = analyzer::unexpected_node(&module, block, "ScheduleBlockRealize");
                    return Err(err.into());
                }
            };
            analyzer::analyze_schedule_block_read_write_buffer(&mut module, sblock)?;
            if let Some(sb) = module.node(sblock).as_schedule_block() {
                for range in &sb.read_buffers {
                    line(&mut out, format_args!("read  {}", range))?;
                }
                for range in &sb.write_buffers {
                    line(&mut out, format_args!("write {}", range))?;
                }
            }
        }
        Command::Classify { block, .. } => {
            let block = analyzer::get_block(&module, block)?;
            let mut reduce_vars: Vec<String> = analyzer::get_reduce_iter_vars(&module, block)?
                .into_iter()
                .map(|v| v.name)
                .collect();
            reduce_vars.sort();
            line(
                &mut out,
                format_args!("reduction: {}", analyzer::is_reduction_sblock(&module, block)?),
            )?;
            line(
                &mut out,
                format_args!("broadcast: {}", analyzer::is_broadcast_sblock(&module, block)?),
            )?;
            line(&mut out, format_args!("reduce_iter_vars: [{}]", reduce_vars.join(", ")))?;
        }
        Command::UnitLoop { block, .. } => {
            let block = analyzer::get_block(&module, block)?;
            analyzer::add_unit_loop(&mut module, block)?;
            out = module_to_json(&module)?;
            out.push('\n');
        }
    }
    Ok(out)
}

fn line(out: &mut String, text: impl std::fmt::Display) -> Result<(), SerialError> {
    writeln!(out, "{}", text)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Maps the number of `-v` flags to a level filter.
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs a stderr `fmt` subscriber. `RUST_LOG` directives override the
/// `-v` level. Only the first call takes effect.
pub fn init_logger(verbose: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level(verbose).into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
