//! Structured error types shared across rsweep crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`LaunchError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (axis names, paths, exit codes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the launcher.
///
/// Failures of delegate programs and of the external runner are not modelled
/// here. The single exception is a runner exiting non-zero, which surfaces as
/// [`LaunchError::Dispatch`] with an `exit_code` context entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum LaunchError {
    /// Invalid launcher configuration or plan contents.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Malformed parameter grids (empty axes, duplicates).
    #[error("grid error: {0}")]
    Grid(ErrorInfo),
    /// Template parsing and rendering errors.
    #[error("template error: {0}")]
    Template(ErrorInfo),
    /// Failures spawning or waiting on the external runner.
    #[error("dispatch error: {0}")]
    Dispatch(ErrorInfo),
    /// Filesystem errors raised by the launcher itself.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl LaunchError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            LaunchError::Config(info)
            | LaunchError::Grid(info)
            | LaunchError::Template(info)
            | LaunchError::Dispatch(info)
            | LaunchError::Io(info)
            | LaunchError::Serde(info) => info,
        }
    }

    /// Exit code reported by the external runner, when the error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::Dispatch(info) => info
                .context
                .get("exit_code")
                .and_then(|code| code.parse().ok()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_hint() {
        let err = LaunchError::Grid(
            ErrorInfo::new("axis-empty", "axis has no values")
                .with_context("axis", "seed")
                .with_hint("list at least one value"),
        );
        assert_eq!(
            err.to_string(),
            "grid error: axis has no values (code: axis-empty) | context: [axis=seed] | hint: list at least one value"
        );
    }

    #[test]
    fn exit_code_only_for_dispatch() {
        let dispatch = LaunchError::Dispatch(
            ErrorInfo::new("runner-failed", "runner exited non-zero").with_context("exit_code", "3"),
        );
        assert_eq!(dispatch.exit_code(), Some(3));
        let io = LaunchError::Io(ErrorInfo::new("x", "y").with_context("exit_code", "3"));
        assert_eq!(io.exit_code(), None);
    }
}
