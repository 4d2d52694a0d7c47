// stream.rs — Redirectable diagnostic output.
//
// DiagnosticStream is a cheap, cloneable handle to one shared sink. The
// manager and the console instance it creates hold clones of the same
// handle, so a redirect made by a case is seen by the instance immediately
// and a restore by the manager undoes it for everyone. Single-threaded by
// construction (Rc/RefCell).

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

enum Target {
    Stderr,
    Redirected(Box<dyn Write>),
}

/// Shared handle to the sink the console writes error messages to.
#[derive(Clone)]
pub struct DiagnosticStream {
    target: Rc<RefCell<Target>>,
}

impl DiagnosticStream {
    /// A stream pointing at standard error.
    pub fn new() -> Self {
        Self {
            target: Rc::new(RefCell::new(Target::Stderr)),
        }
    }

    /// Send everything written from now on to `writer`.
    pub fn redirect(&self, writer: impl Write + 'static) {
        *self.target.borrow_mut() = Target::Redirected(Box::new(writer));
    }

    /// Point the stream back at standard error.
    pub fn restore(&self) {
        let mut target = self.target.borrow_mut();
        if let Target::Redirected(writer) = &mut *target {
            if let Err(e) = writer.flush() {
                tracing::debug!("flushing redirected diagnostics failed: {}", e);
            }
        }
        *target = Target::Stderr;
    }

    /// True while the stream points at standard error.
    pub fn is_default(&self) -> bool {
        matches!(*self.target.borrow(), Target::Stderr)
    }

    /// Write one message followed by a newline.
    pub fn write_message(&self, text: &str) -> io::Result<()> {
        let mut handle = self.clone();
        writeln!(handle, "{}", text)
    }
}

impl Default for DiagnosticStream {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DiagnosticStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = if self.is_default() {
            "stderr"
        } else {
            "redirected"
        };
        f.debug_struct("DiagnosticStream")
            .field("target", &target)
            .finish()
    }
}

impl Write for DiagnosticStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.target.borrow_mut() {
            Target::Stderr => io::stderr().write(buf),
            Target::Redirected(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.target.borrow_mut() {
            Target::Stderr => io::stderr().flush(),
            Target::Redirected(writer) => writer.flush(),
        }
    }
}

/// In-memory writer for capturing diagnostics in tests.
///
/// Clones share the buffer: redirect the stream into one clone and read
/// the text back from another.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
