//! Build-time errors raised while constructing a command tree.
//!
//! Every variant signals a mistake by the author of the tree definition.
//! They are reported once at startup and never at parse time.

use thiserror::Error;

use crate::ValueType;

/// Scope label used for the global option map in error messages.
pub const GLOBAL_SCOPE: &str = "<global>";

/// Errors raised while building or validating a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An option, argument or command has an empty or whitespace-only name.
    #[error("empty name in scope '{0}'")]
    EmptyName(String),
    /// Two options or arguments in the same scope share a name.
    #[error("duplicate option '{name}' in scope '{scope}'")]
    DuplicateOption { scope: String, name: String },
    /// Two options in the same scope share an alias.
    #[error("duplicate alias '-{alias}' in scope '{scope}'")]
    DuplicateAlias { scope: String, alias: char },
    /// A command name with leading or trailing whitespace.
    #[error("command name '{name}' in scope '{scope}' has surrounding whitespace")]
    UntrimmedName { scope: String, name: String },
    /// Two sibling commands share a name.
    #[error("duplicate command '{name}' in scope '{scope}'")]
    DuplicateCommand { scope: String, name: String },
    /// An alias that is not exactly one ASCII letter.
    #[error("invalid alias '{alias}' for option '{option}': must be a single ASCII letter")]
    InvalidAlias { option: String, alias: String },
    /// A flag key outside the known flag set.
    #[error("unknown flag '{flag}' on option '{option}'")]
    UnknownFlag { option: String, flag: String },
    /// A known flag key carrying a value of the wrong shape.
    #[error("invalid value for flag '{flag}' on option '{option}': {reason}")]
    InvalidFlagValue {
        option: String,
        flag: String,
        reason: String,
    },
    /// A default value that does not fit the option's value type.
    #[error("default for option '{option}' is not a valid {value_type}")]
    InvalidDefault {
        option: String,
        value_type: ValueType,
    },
    /// `help` is claimed by the resolver and cannot name a command.
    #[error("'help' is reserved and cannot name a command in scope '{0}'")]
    ReservedName(String),
    /// A registration addressed a command path that does not exist.
    #[error("no command at path '{0}'")]
    UnknownPath(String),
    /// Positional arguments were registered outside any command.
    #[error("positional arguments must belong to a command")]
    RootArgument,
    /// An import named an abstract option that was never defined.
    #[error("unknown abstract option '{0}'")]
    UnknownAbstractOption(String),
    /// Two abstract options share a name.
    #[error("duplicate abstract option '{0}'")]
    DuplicateAbstractOption(String),
    /// A manifest referenced a transform missing from the registry.
    #[error("unknown transform '{transform}' on option '{option}'")]
    UnknownTransform { option: String, transform: String },
    /// A manifest could not be read or decoded.
    #[error("manifest error: {0}")]
    Manifest(String),
}

/// Convenience alias for results with [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;

/// Renders a command path as a scope label.
pub(crate) fn scope_label(path: &[String]) -> String {
    if path.is_empty() {
        GLOBAL_SCOPE.to_string()
    } else {
        path.join(" ")
    }
}
