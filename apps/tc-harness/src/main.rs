//! # ut-testcon
//!
//! Test harness for the console application.
//!
//! Resolves a sandbox directory under the user's home, creates it fresh,
//! runs every registered case against it, and removes it again:
//! - `ut-testcon [FILTER] [--exact]` runs the matching cases
//! - `ut-testcon --list` prints the case names
//! - `--terse-output` prints failures only, `--no-color` disables ANSI color
//!
//! Exit status is 0 when every case passed and 1 otherwise. A fatal harness
//! error (unusable sandbox, bad configuration) prints its source location
//! and "The test has terminated!" and exits with failure, leaving the
//! sandbox for the next run's create to clean.
//!
//! Startup order: harness flags, command line, configuration, sandbox
//! resolution, then the runner. The configuration is read before resolution
//! because `--config` or `$UT_TESTCON_CONFIG` may replace the sandbox
//! template; a bad command line or config file is therefore reported ahead of
//! a missing primary directory. Nothing that touches cases or the sandbox,
//! `--list` included, runs until resolution has succeeded.

mod cases;
mod config;
mod context;
mod error;
mod fixture_console;
mod flags;
mod report;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use tc_sandbox::{DirectoryEraser, SandboxGuard};
use tracing_subscriber::EnvFilter;

use crate::config::HarnessConfig;
use crate::context::TestContext;
use crate::error::HarnessError;
use crate::flags::{HarnessFlags, RunnerArgs};
use crate::report::{DefaultReporter, Reporter, TerseReporter};
use crate::runner::TestRunner;

const DEFAULT_LOG_DIRECTIVES: &[&str] = &["tc_sandbox=info", "tc_console=info", "ut_testcon=info"];

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(e) => terminate(&e),
    }
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("ignoring log directive {}: {}", directive, e),
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run() -> Result<ExitCode, HarnessError> {
    let (flags, rest) = HarnessFlags::extract(std::env::args_os());
    let args = RunnerArgs::parse_from(rest);

    let mut config = HarnessConfig::locate(args.config.as_deref())?;
    if args.pause_on_defect {
        config.pause_on_defect = true;
    }

    let root = config.template().resolve()?;
    tracing::info!("sandbox root {}", root);

    let runner = TestRunner::new(cases::registered()).select(args.filter.as_deref(), args.exact);
    if args.list {
        for name in runner.names() {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut reporter: Box<dyn Reporter> = Box::new(DefaultReporter::stdout(flags.color));
    if flags.terse {
        reporter = Box::new(TerseReporter::stdout(flags.color));
    }

    let eraser = DirectoryEraser::new().with_policy(config.retry_policy());
    let sandbox = SandboxGuard::create_with(root, eraser)?;
    let mut ctx = TestContext::new(sandbox, config.defect_policy());

    let summary = runner.run(&mut ctx, reporter.as_mut())?;

    let report = ctx.into_sandbox().remove()?;
    if !report.is_clean() {
        tracing::warn!(
            "{} entry(ies) could not be removed from the sandbox",
            report.failures.len()
        );
    }

    Ok(ExitCode::from(summary.exit_code()))
}

fn terminate(error: &HarnessError) -> ExitCode {
    eprintln!("{}", error.location());
    eprintln!("{}", error);
    eprintln!("The test has terminated!");
    ExitCode::FAILURE
}
