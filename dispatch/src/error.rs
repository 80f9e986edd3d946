//! Parse-time and dispatch-time failures.
//!
//! Everything here describes a problem with one invocation. Problems with the
//! tree definition itself are [`BuildError`](command_tree_core::BuildError)s
//! and surface before any argument vector is seen.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a [`ParseFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailureKind {
    /// Unrecognized switch before the command name.
    UnknownGlobalOption,
    /// First non-switch token names no top-level command.
    UnknownCommand,
    /// Token names no subcommand of a command that only takes subcommands.
    UnknownSubcommand,
    /// Unrecognized switch inside a command scope.
    UnknownOption,
    /// A switch or argument value failed type coercion, or a value was missing.
    InvalidValue,
    /// A required option or argument has no supplied, inherited or default value.
    MissingRequiredOption,
    /// A transform rejected a supplied value.
    TransformError,
    /// The host's pre-dispatch hook rejected the invocation.
    PreDispatch,
}

impl ParseFailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseFailureKind::UnknownGlobalOption => "unknown-global-option",
            ParseFailureKind::UnknownCommand => "unknown-command",
            ParseFailureKind::UnknownSubcommand => "unknown-subcommand",
            ParseFailureKind::UnknownOption => "unknown-option",
            ParseFailureKind::InvalidValue => "invalid-value",
            ParseFailureKind::MissingRequiredOption => "missing-required-option",
            ParseFailureKind::TransformError => "transform-error",
            ParseFailureKind::PreDispatch => "pre-dispatch",
        }
    }
}

impl fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal, user-facing failure of one resolution.
///
/// Carries the command path reached so far and, where one is involved, the
/// external form of the offending option so hosts can render an actionable
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParseFailure {
    pub kind: ParseFailureKind,
    pub message: String,
    pub command_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

impl ParseFailure {
    pub fn new(kind: ParseFailureKind, message: impl Into<String>, command_path: &[String]) -> Self {
        Self {
            kind,
            message: message.into(),
            command_path: command_path.to_vec(),
            option: None,
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }
}

/// Errors surfaced by [`Dispatcher::run`](crate::Dispatcher::run).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Resolution, transform or pre-dispatch failure.
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// The resolved target has no registered handler.
    #[error("no handler registered for target '{target}' (command '{command}')")]
    HandlerNotFound { target: String, command: String },
}

/// Convenience alias for results with [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;
