// app.rs — The seam to the console application under test.

use crate::stream::DiagnosticStream;

/// A console application the harness can instantiate.
///
/// The harness never looks inside the application; it only binds a fresh
/// instance to its configuration and hands it the diagnostic stream to
/// write error messages to. Dropping the instance destroys it.
pub trait ConsoleApp {
    /// Whatever the application is constructed from (formatter settings,
    /// option set, ...).
    type Config;

    fn bind(config: Self::Config, diagnostics: DiagnosticStream) -> Self;
}
