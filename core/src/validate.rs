//! Build-time validation of option scopes and command names.
//!
//! Catches malformed definitions (duplicate names, bad aliases, defaults of
//! the wrong type, reserved command names) before a tree is frozen, so the
//! resolver never has to guard against them.

use std::collections::HashSet;

use crate::error::{BuildError, Result};
use crate::{CommandSpec, OptionDescriptor};

/// Command name claimed by the resolver for help requests.
pub const RESERVED_HELP: &str = "help";

/// Validates a single option declaration in isolation.
///
/// # Examples
///
/// ```
/// use command_tree_core::{validate_option, BuildError, OptionDescriptor};
///
/// assert!(validate_option(&OptionDescriptor::boolean("verbose").alias('v')).is_ok());
///
/// let err = validate_option(&OptionDescriptor::boolean("verbose").alias('1')).unwrap_err();
/// assert!(matches!(err, BuildError::InvalidAlias { .. }));
///
/// let err = validate_option(&OptionDescriptor::integer("port").default_value("http")).unwrap_err();
/// assert!(matches!(err, BuildError::InvalidDefault { .. }));
/// ```
pub fn validate_option(option: &OptionDescriptor) -> Result<()> {
    let name = option.name.trim();
    if name.is_empty() {
        return Err(BuildError::EmptyName(format!("option of type {}", option.value_type)));
    }

    if let Some(alias) = option.flags.alias {
        if !alias.is_ascii_alphabetic() {
            return Err(BuildError::InvalidAlias {
                option: option.name.clone(),
                alias: alias.to_string(),
            });
        }
    }

    if let Some(default) = &option.flags.default {
        if !option.value_type.accepts(default) {
            return Err(BuildError::InvalidDefault {
                option: option.name.clone(),
                value_type: option.value_type,
            });
        }
    }

    Ok(())
}

/// Validates every option and argument that shares one scope.
///
/// Options and positional arguments land in the same resolved option map,
/// so their names must be unique across both lists. `-` and `_` are
/// interchangeable on the command line and compare equal here.
pub fn validate_scope(
    scope: &str,
    options: &[OptionDescriptor],
    arguments: &[OptionDescriptor],
) -> Result<()> {
    let mut names: HashSet<String> = HashSet::new();
    let mut aliases: HashSet<char> = HashSet::new();

    for option in options.iter().chain(arguments) {
        validate_option(option)?;
        if !names.insert(option.name.replace('-', "_")) {
            return Err(BuildError::DuplicateOption {
                scope: scope.to_string(),
                name: option.name.clone(),
            });
        }
    }

    for alias in options.iter().filter_map(|opt| opt.flags.alias) {
        if !aliases.insert(alias) {
            return Err(BuildError::DuplicateAlias {
                scope: scope.to_string(),
                alias,
            });
        }
    }

    Ok(())
}

/// Validates the names of sibling commands.
pub fn validate_command_names(scope: &str, commands: &[CommandSpec]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for command in commands {
        let name = command.name.as_str();
        if name.trim().is_empty() {
            return Err(BuildError::EmptyName(scope.to_string()));
        }
        if name.trim() != name {
            return Err(BuildError::UntrimmedName {
                scope: scope.to_string(),
                name: name.to_string(),
            });
        }
        if name == RESERVED_HELP {
            return Err(BuildError::ReservedName(scope.to_string()));
        }
        if !seen.insert(name) {
            return Err(BuildError::DuplicateCommand {
                scope: scope.to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}
