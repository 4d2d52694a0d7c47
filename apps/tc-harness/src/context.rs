// context.rs — State handed to every case.

use tc_console::{ConsoleInstanceManager, DefectPolicy};
use tc_sandbox::SandboxGuard;

use crate::fixture_console::FixtureConsole;

/// Owned by the entry point for the whole run and lent to each case in turn.
///
/// Fields are public so a case can borrow the sandbox and the console
/// manager at the same time.
pub struct TestContext {
    pub sandbox: SandboxGuard,
    pub console: ConsoleInstanceManager<FixtureConsole>,
}

impl TestContext {
    pub fn new(sandbox: SandboxGuard, policy: DefectPolicy) -> Self {
        Self {
            sandbox,
            console: ConsoleInstanceManager::with_policy(policy),
        }
    }

    /// Give the sandbox back for removal at the end of the run.
    pub fn into_sandbox(mut self) -> SandboxGuard {
        self.console.reclaim();
        self.sandbox
    }
}
