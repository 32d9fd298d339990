//! GitHub Actions workflow commands written to the job log.
//!
//! The runner turns `::notice::`, `::warning::`, and `::error::` lines on
//! stdout into annotations on the workflow run summary.

use std::io::{self, Write};

/// Severity of a workflow annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationLevel {
    /// Informational message.
    Notice,
    /// Something the user should look at.
    Warning,
    /// The run failed.
    Error,
}

impl AnnotationLevel {
    const fn command(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Writes workflow commands to an output stream.
#[derive(Debug)]
pub struct WorkflowAnnotations<W: Write> {
    out: W,
}

impl<W: Write> WorkflowAnnotations<W> {
    /// Wraps `out`; production code passes a locked stdout.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes one annotation line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn annotate(&mut self, level: AnnotationLevel, message: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "::{}::{}",
            level.command(),
            escape_data(message)
        )
    }

    /// Writes a `notice` annotation.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        self.annotate(AnnotationLevel::Notice, message)
    }

    /// Writes a `warning` annotation.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        self.annotate(AnnotationLevel::Warning, message)
    }

    /// Writes an `error` annotation.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.annotate(AnnotationLevel::Error, message)
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escapes characters the runner treats as command syntax.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
