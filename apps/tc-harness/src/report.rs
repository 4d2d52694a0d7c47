//! report.rs — Run reporters.
//!
//! The runner calls a [`Reporter`] at each step of a run. Two
//! implementations:
//! - [`DefaultReporter`]: one line per case start and end, then a summary
//! - [`TerseReporter`]: only failures, then a one-line summary
//!
//! Both write to any `io::Write` (stdout in the binary) and color with ANSI
//! escapes unless color is turned off.

use std::io::{self, Write};

use crate::runner::{CaseResult, Outcome, RunSummary};

/// Receives progress events from the runner.
pub trait Reporter {
    fn on_run_start(&mut self, total: usize);
    fn on_case_start(&mut self, name: &str);
    fn on_case_end(&mut self, result: &CaseResult);
    fn on_run_end(&mut self, summary: &RunSummary);

    /// Reporter name (for logging).
    fn name(&self) -> &str;
}

/// ANSI escapes, or empty strings when color is off.
#[derive(Debug, Clone, Copy)]
struct Palette {
    green: &'static str,
    red: &'static str,
    yellow: &'static str,
    bold: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                green: "\x1b[32m",
                red: "\x1b[31m",
                yellow: "\x1b[33m",
                bold: "\x1b[1m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                green: "",
                red: "",
                yellow: "",
                bold: "",
                reset: "",
            }
        }
    }
}

fn write_defects<W: Write>(out: &mut W, p: Palette, result: &CaseResult) -> io::Result<()> {
    for defect in &result.defects {
        writeln!(out, "{}  usage defect: {}{}", p.yellow, defect, p.reset)?;
    }
    Ok(())
}

/// Writer plus palette shared by both reporters. Write errors are logged
/// and otherwise ignored.
struct Sink<W> {
    out: W,
    palette: Palette,
}

impl<W: Write> Sink<W> {
    fn new(out: W, color: bool) -> Self {
        Self {
            out,
            palette: Palette::new(color),
        }
    }

    fn emit(&mut self, write: impl FnOnce(&mut W, Palette) -> io::Result<()>) {
        if let Err(e) = write(&mut self.out, self.palette) {
            tracing::debug!("report write failed: {}", e);
        }
    }
}

/// Prints every case as it starts and finishes.
pub struct DefaultReporter<W: Write = io::Stdout> {
    sink: Sink<W>,
}

impl DefaultReporter {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> DefaultReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            sink: Sink::new(out, color),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.out
    }
}

impl<W: Write> Reporter for DefaultReporter<W> {
    fn on_run_start(&mut self, total: usize) {
        self.sink.emit(|out, p| {
            writeln!(out, "{}[==========]{} Running {} case(s).", p.green, p.reset, total)
        });
    }

    fn on_case_start(&mut self, name: &str) {
        self.sink.emit(|out, p| writeln!(out, "{}[ RUN      ]{} {}", p.green, p.reset, name));
    }

    fn on_case_end(&mut self, result: &CaseResult) {
        self.sink.emit(|out, p| {
            write_defects(out, p, result)?;
            let ms = result.elapsed.as_millis();
            match &result.outcome {
                Outcome::Passed => writeln!(
                    out,
                    "{}[       OK ]{} {} ({} ms)",
                    p.green, p.reset, result.name, ms
                ),
                Outcome::Failed(message) => {
                    writeln!(out, "{}", message)?;
                    writeln!(
                        out,
                        "{}[  FAILED  ]{} {} ({} ms)",
                        p.red, p.reset, result.name, ms
                    )
                }
            }
        });
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.sink.emit(|out, p| {
            writeln!(
                out,
                "{}[==========]{} {} case(s) ran. ({} ms total)",
                p.green,
                p.reset,
                summary.total(),
                summary.elapsed.as_millis()
            )?;
            writeln!(
                out,
                "{}[  PASSED  ]{} {} case(s).",
                p.green,
                p.reset,
                summary.passed()
            )?;
            let failed: Vec<&CaseResult> = summary.failures().collect();
            if !failed.is_empty() {
                writeln!(
                    out,
                    "{}[  FAILED  ]{} {} case(s), listed below:",
                    p.red,
                    p.reset,
                    failed.len()
                )?;
                for result in failed {
                    writeln!(out, "{}[  FAILED  ]{} {}", p.red, p.reset, result.name)?;
                }
            }
            out.flush()
        });
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// Prints failures only, then one summary line.
pub struct TerseReporter<W: Write = io::Stdout> {
    sink: Sink<W>,
}

impl TerseReporter {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> TerseReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            sink: Sink::new(out, color),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.out
    }
}

impl<W: Write> Reporter for TerseReporter<W> {
    fn on_run_start(&mut self, _total: usize) {}

    fn on_case_start(&mut self, _name: &str) {}

    fn on_case_end(&mut self, result: &CaseResult) {
        self.sink.emit(|out, p| {
            if let Outcome::Failed(message) = &result.outcome {
                writeln!(out, "{}[  FAILED  ]{} {}", p.red, p.reset, result.name)?;
                writeln!(out, "{}", message)?;
            }
            write_defects(out, p, result)
        });
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.sink.emit(|out, p| {
            let failed = summary.total() - summary.passed();
            let color = if failed == 0 { p.green } else { p.red };
            writeln!(
                out,
                "{}{}{} case(s), {} failed{} ({} ms)",
                p.bold,
                color,
                summary.total(),
                failed,
                p.reset,
                summary.elapsed.as_millis()
            )?;
            out.flush()
        });
    }

    fn name(&self) -> &str {
        "terse"
    }
}
