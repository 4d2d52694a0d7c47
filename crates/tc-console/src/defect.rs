// defect.rs — Usage-defect reporting.
//
// A usage defect is a case breaking the harness's own rules. It is always
// corrected by the caller; this module only makes sure a developer notices:
// every defect is logged and recorded, and with DefectPolicy::Pause the run
// stops at a prompt until ENTER is pressed.

use std::fmt;
use std::io::{self, BufRead, Write};

/// A violation of the harness contract by a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDefect {
    /// An instance was still live when a new one was requested.
    StaleInstance,
    /// The diagnostic stream was still redirected at instance teardown.
    SinkNotRestored,
}

impl fmt::Display for UsageDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageDefect::StaleInstance => {
                write!(f, "console instance not destroyed by previous test")
            }
            UsageDefect::SinkNotRestored => {
                write!(f, "diagnostic stream not restored by test")
            }
        }
    }
}

/// What to do after logging a defect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefectPolicy {
    /// Log and continue.
    #[default]
    Warn,
    /// Log, then wait for ENTER on stdin.
    Pause,
}

/// Logs, records, and optionally pauses on usage defects.
#[derive(Debug, Default)]
pub struct DefectReporter {
    policy: DefectPolicy,
    recorded: Vec<UsageDefect>,
}

impl DefectReporter {
    pub fn new(policy: DefectPolicy) -> Self {
        Self {
            policy,
            recorded: Vec::new(),
        }
    }

    pub fn policy(&self) -> DefectPolicy {
        self.policy
    }

    pub fn report(&mut self, defect: UsageDefect) {
        tracing::warn!("usage defect: {}", defect);
        self.recorded.push(defect);
        if self.policy == DefectPolicy::Pause {
            pause(&defect.to_string());
        }
    }

    /// Defects reported so far, oldest first.
    pub fn recorded(&self) -> &[UsageDefect] {
        &self.recorded
    }

    /// Hand back and forget the recorded defects.
    pub fn take(&mut self) -> Vec<UsageDefect> {
        std::mem::take(&mut self.recorded)
    }
}

/// Print `message` and block until a line is read from stdin.
///
/// Messages of four characters or fewer are not printed, only the prompt.
pub fn pause(message: &str) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if message.len() > 4 {
        let _ = writeln!(out, "{}", message);
    }
    let _ = writeln!(out, "Press ENTER to continue.");
    let _ = out.flush();
    drop(out);

    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        tracing::debug!("pause prompt could not read stdin: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_records_in_order() {
        let mut reporter = DefectReporter::new(DefectPolicy::Warn);
        reporter.report(UsageDefect::StaleInstance);
        reporter.report(UsageDefect::SinkNotRestored);

        assert_eq!(
            reporter.recorded(),
            &[UsageDefect::StaleInstance, UsageDefect::SinkNotRestored]
        );
        assert_eq!(reporter.take().len(), 2);
        assert!(reporter.recorded().is_empty());
    }

    #[test]
    fn default_policy_is_warn() {
        assert_eq!(DefectReporter::default().policy(), DefectPolicy::Warn);
    }

    #[test]
    fn defect_display() {
        assert_eq!(
            UsageDefect::StaleInstance.to_string(),
            "console instance not destroyed by previous test"
        );
        assert_eq!(
            UsageDefect::SinkNotRestored.to_string(),
            "diagnostic stream not restored by test"
        );
    }
}
