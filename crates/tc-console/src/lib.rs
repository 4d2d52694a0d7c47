//! # tc-console
//!
//! Lifecycle of the console application under test.
//!
//! The console writes its error messages to a redirectable
//! [`DiagnosticStream`]. Cases redirect it to capture output and are expected
//! to put it back. A [`ConsoleInstanceManager`] holds at most one live
//! instance at a time and checks both rules on every create/destroy:
//!
//! - creating while an instance is still live means the previous case did
//!   not clean up; the stale instance is destroyed first,
//! - destroying with the stream still redirected means the case forgot to
//!   restore it; the default is restored anyway.
//!
//! Both are reported as [`UsageDefect`]s and corrected, so one careless case
//! cannot leak state into the next.

pub mod app;
pub mod defect;
pub mod manager;
pub mod stream;

pub use app::ConsoleApp;
pub use defect::{DefectPolicy, DefectReporter, UsageDefect};
pub use manager::ConsoleInstanceManager;
pub use stream::{CaptureBuffer, DiagnosticStream};
