use std::error::Error;
use std::fmt;

use thiserror::Error;

use crate::model::Snapshot;

/// Kinds of failures while scanning a crash dump.
///
/// Each variant corresponds to a grammar element the parser expected but did
/// not find, or a syntactically matching line whose numeric field could not
/// be parsed.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanErrorKind {
    /// Reading from the input or writing to the sink failed.
    Io,

    /// A line inside a goroutine block did not start with the indentation
    /// prefix captured from the block's header.
    InconsistentIndentation,

    /// Expected a function call after a goroutine header.
    ExpectedFunction,

    /// Expected a source location after a function call.
    ExpectedFile,

    /// Expected a source location after a `created by` line.
    ExpectedCreatedFile,

    /// Expected an empty line to close the goroutine or race block.
    ExpectedEmptyLine,

    /// Expected a function call inside a race operation stack.
    ExpectedRaceFunction,

    /// Expected a race operation or race goroutine header.
    ExpectedRaceHeader,

    /// A numeric field (goroutine ID, line number or argument value) failed
    /// to parse.
    InvalidNumber,

    /// The address of a racing access failed to parse.
    InvalidAddress,

    /// A race creation stack referenced a goroutine ID that was not part of
    /// the report.
    UnknownGoroutine,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanErrorKind::Io => write!(f, "input/output error"),
            ScanErrorKind::InconsistentIndentation => write!(f, "inconsistent indentation"),
            ScanErrorKind::ExpectedFunction => {
                write!(f, "expected a function after a goroutine header")
            }
            ScanErrorKind::ExpectedFile => write!(f, "expected a file after a function"),
            ScanErrorKind::ExpectedCreatedFile => {
                write!(f, "expected a file after a created line")
            }
            ScanErrorKind::ExpectedEmptyLine => write!(f, "expected an empty line"),
            ScanErrorKind::ExpectedRaceFunction => {
                write!(f, "expected a function in a race stack")
            }
            ScanErrorKind::ExpectedRaceHeader => {
                write!(f, "expected a race operation or goroutine")
            }
            ScanErrorKind::InvalidNumber => write!(f, "failed to parse a number"),
            ScanErrorKind::InvalidAddress => write!(f, "failed to parse an address"),
            ScanErrorKind::UnknownGoroutine => write!(f, "unexpected goroutine ID"),
        }
    }
}

/// An error returned while scanning a crash dump.
///
/// Scanning stops at the first fatal error, but everything parsed up to
/// that point is kept and can be retrieved with
/// [`into_snapshot`](ScanError::into_snapshot).
#[derive(Debug, Error)]
pub struct ScanError {
    kind: ScanErrorKind,
    line: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
    snapshot: Option<Box<Snapshot>>,
}

impl ScanError {
    pub(crate) fn new(kind: ScanErrorKind, line: &str) -> ScanError {
        ScanError {
            kind,
            line: line.trim().to_string(),
            source: None,
            snapshot: None,
        }
    }

    pub(crate) fn io(source: std::io::Error) -> ScanError {
        ScanError {
            kind: ScanErrorKind::Io,
            line: String::new(),
            source: Some(Box::new(source)),
            snapshot: None,
        }
    }

    pub(crate) fn with_snapshot(mut self, snapshot: Option<Snapshot>) -> ScanError {
        self.snapshot = snapshot.map(Box::new);
        self
    }

    /// Returns the corresponding [`ScanErrorKind`] for this error.
    pub fn kind(&self) -> ScanErrorKind {
        self.kind
    }

    /// The offending line, trimmed. Empty for I/O errors.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The goroutines parsed before the error occurred, if any were.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_deref()
    }

    /// Consumes the error, returning the goroutines parsed before the error
    /// occurred.
    pub fn into_snapshot(self) -> Option<Snapshot> {
        self.snapshot.map(|s| *s)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.line.is_empty() {
            write!(f, ", got: {:?}", self.line)?;
        }
        Ok(())
    }
}

impl From<ScanErrorKind> for ScanError {
    fn from(kind: ScanErrorKind) -> ScanError {
        ScanError {
            kind,
            line: String::new(),
            source: None,
            snapshot: None,
        }
    }
}
