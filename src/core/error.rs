//! Error types for Kodama.
//!
//! Uses thiserror for structured errors with context. Every error carries
//! enough to act on it without rerunning: the script line, the filter and
//! parameter involved, or the path and the underlying cause.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Kodama.
#[derive(Error, Debug)]
pub enum KodamaError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Resource(#[from] ResourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A script could not be parsed; the whole script is rejected.
#[derive(Error, Debug)]
#[error("error on line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number of the offending line.
    pub line: usize,
    /// What went wrong on that line.
    pub kind: ParseErrorKind,
}

/// Reasons a script line is rejected.
#[derive(Error, Debug)]
pub enum ParseErrorKind {
    #[error("syntax error, expected syntax: with <input> as <output>")]
    MalformedStepHeader,

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// An instruction line could not be bound to a filter.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid syntax for {filter}, expected usage: {usage}")]
    WrongArity { filter: String, usage: String },

    #[error("invalid parameter '{parameter}' for {filter}: {reason} (got '{value}')")]
    InvalidParameter {
        filter: String,
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("parameter '{parameter}' of {filter} must be > 0")]
    NotPositive { filter: String, parameter: String },

    #[error("can't load overlay for {filter}: {source}")]
    Overlay {
        filter: String,
        #[source]
        source: ResourceError,
    },
}

/// An image could not be read from or written to disk.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("can't read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("can't encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("can't write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl KodamaError {
    /// Whether the error was raised while parsing, before anything ran.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, KodamaError::Parse(_))
    }

    /// The parse error, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            KodamaError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl ParseError {
    /// Create a parse error for `line`.
    pub fn new(line: usize, kind: impl Into<ParseErrorKind>) -> Self {
        Self {
            line,
            kind: kind.into(),
        }
    }

    /// 1-based line number of the offending line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The binding failure behind this error, if any.
    pub fn bind_error(&self) -> Option<&BindError> {
        match &self.kind {
            ParseErrorKind::Bind(e) => Some(e),
            ParseErrorKind::MalformedStepHeader => None,
        }
    }
}

impl BindError {
    /// The filter name the error refers to.
    pub fn filter_name(&self) -> &str {
        match self {
            BindError::UnknownOperation(name) => name,
            BindError::WrongArity { filter, .. }
            | BindError::InvalidParameter { filter, .. }
            | BindError::NotPositive { filter, .. }
            | BindError::Overlay { filter, .. } => filter,
        }
    }
}

impl ResourceError {
    /// The path that could not be read or written.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ResourceError::Read { path, .. }
            | ResourceError::Decode { path, .. }
            | ResourceError::Encode { path, .. }
            | ResourceError::Write { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_has_line() {
        let error = ParseError::new(3, ParseErrorKind::MalformedStepHeader);
        assert_eq!(
            error.to_string(),
            "error on line 3: syntax error, expected syntax: with <input> as <output>"
        );
        assert!(error.bind_error().is_none());
    }

    #[test]
    fn test_bind_error_through_parse_error() {
        let error = ParseError::new(7, BindError::UnknownOperation("frobnicate".to_string()));
        assert_eq!(error.to_string(), "error on line 7: unknown operation: frobnicate");
        assert_eq!(error.bind_error().unwrap().filter_name(), "frobnicate");
    }

    #[test]
    fn test_resource_error_mentions_path() {
        let error = ResourceError::Read {
            path: PathBuf::from("missing.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(error.to_string().contains("missing.jpg"));
        assert_eq!(error.path(), std::path::Path::new("missing.jpg"));

        let top: KodamaError = error.into();
        assert!(!top.is_parse_error());
    }
}
