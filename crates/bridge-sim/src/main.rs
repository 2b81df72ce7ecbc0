//! CLI entry point for the bridge scenario simulator.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bridge_core as _;
use bridge_sim::{parse_scenario, run_scenario, RunReport, Scenario};
use thiserror as _;
use tracing::debug;
use tracing_subscriber::EnvFilter;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: axi-bridge-sim <command> <scenario> [options]

Commands:
  run   <scenario> [--stats] [--verbose]  Run traffic and print every response
  check <scenario> [--verbose]            Run traffic and evaluate expectations

Options:
  -s, --stats    Print bridge activity counters after the response trace
  -v, --verbose  Log bridge events to stderr (filter with RUST_LOG)
  -h, --help     Show this help message

Examples:
  axi-bridge-sim run scenarios/ordering.bridge
  axi-bridge-sim check scenarios/errors.bridge -v
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Check(CheckArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    stats: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    input: PathBuf,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_run_args(args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut stats = false;
    let mut verbose = false;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }
        if arg == "--stats" || arg == "-s" {
            stats = true;
            continue;
        }
        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }
        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }
        if input.is_some() {
            return Err("multiple scenario paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing scenario path".to_string())?;
    Ok(RunArgs {
        input,
        stats,
        verbose,
    })
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut verbose = false;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }
        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }
        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }
        if input.is_some() {
            return Err("multiple scenario paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing scenario path".to_string())?;
    Ok(CheckArgs { input, verbose })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: failed to install log subscriber: {e}");
    }
}

fn load_scenario(input: &Path) -> Result<Scenario, i32> {
    let source = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", input.display());
        1
    })?;
    let scenario = parse_scenario(&source).map_err(|e| {
        eprintln!("{}: {e}", input.display());
        1
    })?;
    debug!(
        path = %input.display(),
        steps = scenario.steps.len(),
        "scenario loaded"
    );
    Ok(scenario)
}

fn execute(input: &Path) -> Result<RunReport, i32> {
    let scenario = load_scenario(input)?;
    run_scenario(&scenario).map_err(|e| {
        eprintln!("{}: error: {e}", input.display());
        1
    })
}

fn run_run(args: &RunArgs) -> Result<(), i32> {
    let report = execute(&args.input)?;

    for record in &report.responses {
        println!("{record}");
    }

    if args.stats {
        let stats = report.stats;
        println!();
        println!(
            "cycles={} granted={} refused={} reads={} writes={} errors={} peak_outstanding={}",
            stats.cycles,
            stats.granted,
            stats.refused,
            stats.read_responses,
            stats.write_responses,
            stats.error_responses,
            stats.peak_outstanding
        );
    }

    Ok(())
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    let report = execute(&args.input)?;

    if report.expectations.is_empty() {
        println!("No expectations found in {}", args.input.display());
        return Ok(());
    }

    for result in &report.expectations {
        println!("{result}");
    }

    let summary = report.summary();
    println!();
    println!(
        "Check Summary: {summary} (total: {})",
        report.expectations.len()
    );

    if report.all_passed() {
        Ok(())
    } else {
        Err(1)
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => {
            if args.verbose {
                init_tracing();
            }
            match run_run(&args) {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Ok(ParseResult::Command(Command::Check(args))) => {
            if args.verbose {
                init_tracing();
            }
            match run_check(&args) {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
