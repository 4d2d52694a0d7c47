// fixture_console.rs — A small console application for the harness's own cases.
//
// Stands in for the real console under test: it reads an options file,
// rejects anything that is not a long option, and "formats" input files by
// trimming trailing whitespace. Every error goes to the diagnostic stream it
// was bound to, exactly like the real console, so cases can capture and
// assert on it.

use std::fs;
use std::path::PathBuf;

use tc_console::{ConsoleApp, DiagnosticStream};

/// What a FixtureConsole is constructed from.
#[derive(Debug, Clone, Default)]
pub struct FixtureOptions {
    pub options_file: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

pub struct FixtureConsole {
    options: FixtureOptions,
    diagnostics: DiagnosticStream,
    accepted: Vec<String>,
}

impl ConsoleApp for FixtureConsole {
    type Config = FixtureOptions;

    fn bind(options: FixtureOptions, diagnostics: DiagnosticStream) -> Self {
        Self {
            options,
            diagnostics,
            accepted: Vec::new(),
        }
    }
}

impl FixtureConsole {
    fn error(&self, message: &str) {
        if let Err(e) = self.diagnostics.write_message(message) {
            tracing::debug!("diagnostic write failed: {}", e);
        }
    }

    /// Options accepted by the last `process_options` call.
    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    /// Read the options file. Returns false if it cannot be read or holds
    /// an invalid option; the invalid options are listed on the stream.
    pub fn process_options(&mut self) -> bool {
        self.accepted.clear();
        let path = match &self.options.options_file {
            Some(path) => path,
            None => return true,
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                self.error(&format!("Cannot open options file {}", path.display()));
                return false;
            }
        };

        let mut invalid = Vec::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.len() > 2 && line.starts_with("--") {
                self.accepted.push(line.to_string());
            } else {
                invalid.push(line.to_string());
            }
        }
        if invalid.is_empty() {
            return true;
        }
        self.error("Invalid option file options:");
        for option in &invalid {
            self.error(option);
        }
        false
    }

    /// Trim trailing whitespace in every input file. Returns the number of
    /// files changed; missing or unreadable files are reported and skipped.
    pub fn format_files(&mut self) -> usize {
        let mut changed = 0;
        for path in &self.options.files {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(_) => {
                    self.error(&format!("Cannot open input file {}", path.display()));
                    continue;
                }
            };
            let mut formatted: String = text
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
            if text.ends_with('\n') {
                formatted.push('\n');
            }
            if formatted == text {
                continue;
            }
            match fs::write(path, formatted) {
                Ok(()) => changed += 1,
                Err(_) => self.error(&format!("Cannot write output file {}", path.display())),
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_console::CaptureBuffer;
    use tempfile::tempdir;

    fn bound(options: FixtureOptions) -> (FixtureConsole, CaptureBuffer) {
        let stream = DiagnosticStream::new();
        let capture = CaptureBuffer::new();
        stream.redirect(capture.clone());
        (FixtureConsole::bind(options, stream), capture)
    }

    #[test]
    fn valid_options_are_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.rc");
        fs::write(&path, "# style\n--indent=spaces\n\n--break-blocks\n").unwrap();

        let (mut console, capture) = bound(FixtureOptions {
            options_file: Some(path),
            files: Vec::new(),
        });
        assert!(console.process_options());
        assert_eq!(console.accepted(), ["--indent=spaces", "--break-blocks"]);
        assert!(capture.is_empty());
    }

    #[test]
    fn invalid_options_are_listed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.rc");
        fs::write(&path, "--indent=tab\nbogus\n-x\n").unwrap();

        let (mut console, capture) = bound(FixtureOptions {
            options_file: Some(path),
            files: Vec::new(),
        });
        assert!(!console.process_options());
        assert_eq!(
            capture.contents(),
            "Invalid option file options:\nbogus\n-x\n"
        );
    }

    #[test]
    fn format_trims_and_reports_missing() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("a.cpp");
        let missing = dir.path().join("b.cpp");
        fs::write(&present, "int a;   \nint b;\t\n").unwrap();

        let (mut console, capture) = bound(FixtureOptions {
            options_file: None,
            files: vec![present.clone(), missing.clone()],
        });
        assert_eq!(console.format_files(), 1);
        assert_eq!(fs::read_to_string(&present).unwrap(), "int a;\nint b;\n");
        assert_eq!(
            capture.contents(),
            format!("Cannot open input file {}\n", missing.display())
        );

        assert_eq!(console.format_files(), 0);
    }
}
