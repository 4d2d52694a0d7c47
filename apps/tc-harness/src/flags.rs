// flags.rs — Command-line handling.
//
// Two harness flags are consumed before the runner's parser runs, so they
// are accepted anywhere on the command line and never reach it. Everything
// else is parsed into RunnerArgs.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use clap::Parser;

const TERSE_FLAGS: &[&str] = &["--terse-output", "--terse_printer"];
const NO_COLOR_FLAGS: &[&str] = &["--no-color", "--gtest_color=no"];

/// Flags owned by the entry point rather than the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessFlags {
    /// Replace the default reporter with the compact one.
    pub terse: bool,
    /// Emit ANSI colors.
    pub color: bool,
}

impl Default for HarnessFlags {
    fn default() -> Self {
        Self {
            terse: false,
            color: true,
        }
    }
}

impl HarnessFlags {
    /// Split the harness flags out of `args`, keeping the rest in order.
    ///
    /// The first element (program name) is always passed through.
    pub fn extract<I>(args: I) -> (Self, Vec<OsString>)
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut flags = Self::default();
        let mut rest = Vec::new();
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 && matches_any(&arg, TERSE_FLAGS) {
                flags.terse = true;
            } else if i > 0 && matches_any(&arg, NO_COLOR_FLAGS) {
                flags.color = false;
            } else {
                rest.push(arg);
            }
        }
        (flags, rest)
    }
}

fn matches_any(arg: &OsStr, names: &[&str]) -> bool {
    names.iter().any(|name| arg == OsStr::new(name))
}

/// Console test harness: runs the registered cases inside a fresh sandbox.
#[derive(Debug, Parser)]
#[command(name = "ut-testcon", version, about)]
pub struct RunnerArgs {
    /// Only run cases whose name contains this text.
    pub filter: Option<String>,

    /// Print the names of the selected cases and exit.
    #[arg(long)]
    pub list: bool,

    /// Treat the filter as an exact case name.
    #[arg(long, requires = "filter")]
    pub exact: bool,

    /// Harness configuration file (TOML). Falls back to $UT_TESTCON_CONFIG.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop at a prompt whenever a case breaks the harness contract.
    #[arg(long)]
    pub pause_on_defect: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn no_flags_passes_everything_through() {
        let (flags, rest) = HarnessFlags::extract(os(&["ut-testcon", "sandbox", "--list"]));
        assert_eq!(flags, HarnessFlags::default());
        assert_eq!(rest, os(&["ut-testcon", "sandbox", "--list"]));
    }

    #[test]
    fn harness_flags_are_stripped_in_place() {
        let (flags, rest) = HarnessFlags::extract(os(&[
            "ut-testcon",
            "--terse-output",
            "scoped",
            "--no-color",
            "--exact",
        ]));
        assert!(flags.terse);
        assert!(!flags.color);
        assert_eq!(rest, os(&["ut-testcon", "scoped", "--exact"]));
    }

    #[test]
    fn aliases_are_recognised() {
        let (flags, rest) =
            HarnessFlags::extract(os(&["ut-testcon", "--gtest_color=no", "--terse_printer"]));
        assert!(flags.terse);
        assert!(!flags.color);
        assert_eq!(rest, os(&["ut-testcon"]));
    }

    #[test]
    fn program_name_is_never_a_flag() {
        let (flags, rest) = HarnessFlags::extract(os(&["--no-color"]));
        assert!(flags.color);
        assert_eq!(rest, os(&["--no-color"]));
    }

    #[test]
    fn runner_args_parse_remaining() {
        let args = RunnerArgs::try_parse_from([
            "ut-testcon",
            "erase_removes_nested_tree",
            "--exact",
            "--config",
            "harness.toml",
        ])
        .unwrap();
        assert_eq!(args.filter.as_deref(), Some("erase_removes_nested_tree"));
        assert!(args.exact);
        assert!(!args.list);
        assert_eq!(args.config, Some(PathBuf::from("harness.toml")));
    }

    #[test]
    fn runner_rejects_unstripped_harness_flag() {
        assert!(RunnerArgs::try_parse_from(["ut-testcon", "--terse-output"]).is_err());
    }
}
