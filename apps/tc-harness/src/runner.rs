// runner.rs — Sequential case runner.
//
// Cases run one at a time against the shared TestContext. A panic inside a
// case (a failed assertion) marks that case failed and the run continues. An
// Err returned by a case is a fatal harness error and ends the run at once.
// Between cases the runner reclaims any console instance the case left live
// and empties the sandbox, so each case starts from the same state.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tc_console::UsageDefect;

use crate::context::TestContext;
use crate::error::HarnessError;
use crate::report::Reporter;

pub type CaseFn = fn(&mut TestContext) -> Result<(), HarnessError>;

/// A named case.
#[derive(Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub run: CaseFn,
}

impl TestCase {
    pub const fn new(name: &'static str, run: CaseFn) -> Self {
        Self { name, run }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// The panic message of the failed assertion.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: &'static str,
    pub outcome: Outcome,
    pub elapsed: Duration,
    /// Usage defects reported while the case ran or at its teardown.
    pub defects: Vec<UsageDefect>,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Results of one run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<CaseResult>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    /// Process exit status: 0 when every case passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.passed() == self.total() {
            0
        } else {
            1
        }
    }
}

pub struct TestRunner {
    cases: Vec<TestCase>,
}

impl TestRunner {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    /// Keep only the cases whose name contains `filter`, or equals it when
    /// `exact` is set.
    pub fn select(mut self, filter: Option<&str>, exact: bool) -> Self {
        if let Some(filter) = filter {
            self.cases.retain(|case| {
                if exact {
                    case.name == filter
                } else {
                    case.name.contains(filter)
                }
            });
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cases.iter().map(|case| case.name)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn run(
        &self,
        ctx: &mut TestContext,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary, HarnessError> {
        tracing::info!(
            "running {} case(s) with {} reporter",
            self.cases.len(),
            reporter.name()
        );
        let started = Instant::now();
        let mut summary = RunSummary::default();
        reporter.on_run_start(self.cases.len());

        for case in &self.cases {
            reporter.on_case_start(case.name);
            let case_started = Instant::now();

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (case.run)(ctx))) {
                Ok(Ok(())) => Outcome::Passed,
                Ok(Err(e)) => {
                    tracing::error!("case {} aborted the run: {}", case.name, e);
                    return Err(e);
                }
                Err(payload) => Outcome::Failed(panic_message(payload.as_ref())),
            };

            ctx.console.reclaim();
            let report = ctx.sandbox.erase()?;
            if !report.is_clean() {
                tracing::warn!(
                    "{} entry(ies) left in sandbox after {}",
                    report.failures.len(),
                    case.name
                );
            }

            let result = CaseResult {
                name: case.name,
                outcome,
                elapsed: case_started.elapsed(),
                defects: ctx.console.take_defects(),
            };
            reporter.on_case_end(&result);
            summary.results.push(result);
        }

        summary.elapsed = started.elapsed();
        reporter.on_run_end(&summary);
        tracing::info!(
            "{} of {} case(s) passed",
            summary.passed(),
            summary.total()
        );
        Ok(summary)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "case panicked".to_string()
    }
}
