use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- More transparency into error handling logic
 */

/// Error variants that can occur in livefile operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file does not exist and missing files were not allowed
    NotFound { path: PathBuf },

    /// The file content does not conform to the format's grammar.
    /// The parser diagnostic is attached as the cause.
    ParseFailure { path: PathBuf },

    /// The parsed content was rejected by the validator
    ValidationFailure { path: PathBuf, content: String },

    /// Serializing or writing the file on close failed.
    /// The underlying error is attached as the cause.
    WriteFailure { path: PathBuf },

    /// Text is not well-formed for the given format
    Syntax {
        format: &'static str,
        message: String,
    },

    /// Text is well-formed but does not fit the requested type
    Shape {
        format: &'static str,
        message: String,
    },

    /// Multiple errors occurred during a single operation
    Multiple {
        errors: Vec<LivefileError>,
        count: usize,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::NotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            ErrorKind::ParseFailure { path } => {
                write!(f, "Failed to parse {}", path.display())
            }
            ErrorKind::ValidationFailure { path, .. } => {
                write!(f, "Validation failed for {}", path.display())
            }
            ErrorKind::WriteFailure { path } => {
                write!(f, "Failed to write {}", path.display())
            }
            ErrorKind::Syntax { format, message } => {
                write!(f, "Invalid {}: {}", format, message)
            }
            ErrorKind::Shape { format, message } => {
                write!(f, "Unexpected {} structure: {}", format, message)
            }
            ErrorKind::Multiple { errors, count } => {
                write!(f, "Multiple errors occurred ({} total)", count)?;
                if let Some(first) = errors.first() {
                    write!(f, ": {}", first)?;
                }
                Ok(())
            }
            ErrorKind::Message { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

/* 📖 # Why separate ErrorKind and LivefileError?
ErrorKind holds the structural variants callers match on (not found, parse failure,
validation failure, write failure). LivefileError wraps a kind with context strings,
an optional cause and the span trace captured where the error was created.
*/

/// Error type wrapping an [`ErrorKind`] with context, an optional cause and a span trace.
pub struct LivefileError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<LivefileError>>,
    span_trace: SpanTrace,
}

impl LivefileError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a [`ErrorKind::Message`] error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that caused this one.
    pub fn caused_by(mut self, cause: impl Into<Box<LivefileError>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the attached context strings, oldest first.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// Returns the error that caused this one, if any.
    pub fn cause(&self) -> Option<&LivefileError> {
        self.cause.as_deref()
    }

    /// Returns the span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let item_count = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i + 1 == item_count { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, ctx)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{}└─ cause: {}", indent, cause.kind)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for LivefileError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ErrorKind> for Box<LivefileError> {
    fn from(kind: ErrorKind) -> Self {
        Box::new(LivefileError::new(kind))
    }
}

impl StdError for LivefileError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        if let Some(cause) = &self.cause {
            return Some(cause.as_ref());
        }
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Multiple { errors, .. } => errors.first().and_then(|e| e.source()),
            _ => None,
        }
    }
}

impl fmt::Display for LivefileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl fmt::Debug for LivefileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<LivefileError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.
*/

/// Standard result type for livefile operations.
pub type LivefileResult<T> = std::result::Result<T, Box<LivefileError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> LivefileResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> LivefileResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for LivefileResult<T> {
    fn context(self, context: impl Into<String>) -> LivefileResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> LivefileResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Creates a boxed [`ErrorKind::Message`] error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::LivefileError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed [`ErrorKind::Message`] error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
