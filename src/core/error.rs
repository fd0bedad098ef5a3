//! PF-002: Error and diagnostic types.
//!
//! Hard failures (`GenerationError`) abort a generation call. Everything the
//! controller operator should merely be told about travels as a `Diagnostic`
//! alongside whatever text was produced.

use super::types::Manufacturer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure that aborts a generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The selected manufacturer has no emitter.
    #[error("manufacturer '{0}' is not implemented")]
    Configuration(Manufacturer),

    /// Export path unwritable, disk full, and similar.
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Job file could not be read or parsed.
    #[error("{0}")]
    Parse(String),

    /// Job file parsed but failed validation.
    #[error("job is invalid: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A target could not be turned into an instruction.
    #[error("target {index}: {message}")]
    Target { index: usize, message: String },
}

impl GenerationError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unimplemented manufacturer selected.
    ConfigurationError,
    /// Program length exceeds a controller's recommended maximum.
    ValidationWarning,
    /// Module failed its validity predicate.
    StructuralInvalid,
    /// Export failed part way.
    IoFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationError => write!(f, "configuration"),
            Self::ValidationWarning => write!(f, "length"),
            Self::StructuralInvalid => write!(f, "structure"),
            Self::IoFailure => write!(f, "io"),
        }
    }
}

/// A non-fatal report produced during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Diagnostic form of a hard error, for callers that report instead of abort.
    pub fn from_error(err: &GenerationError) -> Self {
        let kind = match err {
            GenerationError::Configuration(_) => DiagnosticKind::ConfigurationError,
            GenerationError::Io { .. } => DiagnosticKind::IoFailure,
            GenerationError::Parse(_)
            | GenerationError::Validation(_)
            | GenerationError::Target { .. } => {
                DiagnosticKind::StructuralInvalid
            }
        };
        Self::error(kind, err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{} [{}]: {}", label, self.kind, self.message)
    }
}
