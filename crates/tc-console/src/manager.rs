// manager.rs — ConsoleInstanceManager: the one slot for the console under test.
//
// The manager is owned by the per-run test context and passed to every case;
// there is no global. `create_instance` and `destroy_instance` are the only
// operations that change the slot. Both enforce the harness contract and
// repair violations after reporting them.

use crate::app::ConsoleApp;
use crate::defect::{DefectPolicy, DefectReporter, UsageDefect};
use crate::stream::DiagnosticStream;

/// Holds at most one live instance of `A` and the diagnostic stream it
/// writes to.
pub struct ConsoleInstanceManager<A: ConsoleApp> {
    slot: Option<A>,
    diagnostics: DiagnosticStream,
    defects: DefectReporter,
}

impl<A: ConsoleApp> ConsoleInstanceManager<A> {
    pub fn new() -> Self {
        Self::with_policy(DefectPolicy::default())
    }

    pub fn with_policy(policy: DefectPolicy) -> Self {
        Self {
            slot: None,
            diagnostics: DiagnosticStream::new(),
            defects: DefectReporter::new(policy),
        }
    }

    /// Install a new instance bound to `config`.
    ///
    /// If one is still live the previous case did not clean up: that is
    /// reported and the stale instance is destroyed before the new one is
    /// created.
    pub fn create_instance(&mut self, config: A::Config) -> &mut A {
        if self.slot.is_some() {
            self.defects.report(UsageDefect::StaleInstance);
            self.destroy_instance();
        }
        tracing::debug!("creating console instance");
        let instance = A::bind(config, self.diagnostics.clone());
        self.slot.insert(instance)
    }

    /// Destroy the live instance (if any) and restore the diagnostic stream.
    ///
    /// A stream left redirected is reported; the default is restored either
    /// way so the next case starts clean.
    pub fn destroy_instance(&mut self) {
        if let Some(instance) = self.slot.take() {
            tracing::debug!("destroying console instance");
            drop(instance);
        }
        if !self.diagnostics.is_default() {
            self.defects.report(UsageDefect::SinkNotRestored);
        }
        self.diagnostics.restore();
    }

    /// Called between cases. An instance the finished case left live is
    /// reported as stale and destroyed; the stream is checked as in
    /// `destroy_instance`.
    pub fn reclaim(&mut self) {
        if self.slot.is_some() {
            self.defects.report(UsageDefect::StaleInstance);
        }
        self.destroy_instance();
    }

    pub fn is_live(&self) -> bool {
        self.slot.is_some()
    }

    pub fn instance(&self) -> Option<&A> {
        self.slot.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut A> {
        self.slot.as_mut()
    }

    /// The stream handed to every instance. Cases redirect it to capture
    /// error output.
    pub fn diagnostics(&self) -> &DiagnosticStream {
        &self.diagnostics
    }

    pub fn defects(&self) -> &[UsageDefect] {
        self.defects.recorded()
    }

    pub fn take_defects(&mut self) -> Vec<UsageDefect> {
        self.defects.take()
    }
}

impl<A: ConsoleApp> Default for ConsoleInstanceManager<A> {
    fn default() -> Self {
        Self::new()
    }
}
