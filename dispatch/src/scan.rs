//! Switch scanning for a single option scope.
//!
//! The scanner consumes leading `--name`, `--name=value`, `--no-name` and
//! `-a [value]` tokens, coerces their values and records them. It stops at the
//! first token it does not own and reports why, leaving classification of
//! that token to the resolver.

use std::collections::BTreeMap;

use command_tree_core::{CommandDescriptor, OptionDescriptor, Value, ValueType};
use tracing::trace;

/// One occurrence of an option on the command line.
#[derive(Debug, Clone)]
pub(crate) struct Occurrence {
    pub raw: String,
    pub value: Value,
}

/// Values supplied for one option name, tied to the descriptor that parsed them.
#[derive(Debug, Clone)]
pub(crate) struct Supplied<'t> {
    pub descriptor: &'t OptionDescriptor,
    pub positional: bool,
    pub occurrences: Vec<Occurrence>,
}

impl Supplied<'_> {
    /// The form a user would recognise: `--name` or `<name>`.
    pub fn external_name(&self) -> String {
        if self.positional {
            self.descriptor.argument_name()
        } else {
            self.descriptor.canonical_name()
        }
    }
}

/// Explicitly supplied values accumulated across every scope of one resolution.
#[derive(Debug, Default)]
pub(crate) struct SuppliedOptions<'t> {
    entries: BTreeMap<String, Supplied<'t>>,
}

impl<'t> SuppliedOptions<'t> {
    /// Records an occurrence.
    ///
    /// A value parsed by a different descriptor than the one already stored
    /// under the same name (a redeclaration in an inner scope) replaces the
    /// inherited entry. Otherwise the occurrence is appended; finalize
    /// decides how occurrences combine.
    pub fn record(&mut self, descriptor: &'t OptionDescriptor, raw: &str, value: Value) {
        self.insert(descriptor, false, raw, value);
    }

    /// Records the value of a positional argument.
    pub fn record_argument(&mut self, descriptor: &'t OptionDescriptor, raw: &str, value: Value) {
        self.insert(descriptor, true, raw, value);
    }

    fn insert(&mut self, descriptor: &'t OptionDescriptor, positional: bool, raw: &str, value: Value) {
        let occurrence = Occurrence {
            raw: raw.to_string(),
            value,
        };
        match self.entries.get_mut(&descriptor.name) {
            Some(entry) if std::ptr::eq(entry.descriptor, descriptor) => {
                entry.occurrences.push(occurrence);
            }
            _ => {
                self.entries.insert(
                    descriptor.name.clone(),
                    Supplied {
                        descriptor,
                        positional,
                        occurrences: vec![occurrence],
                    },
                );
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, Supplied<'t>)> {
        self.entries.into_iter()
    }
}

/// The option descriptors visible to one scan, innermost layer first.
#[derive(Debug, Clone)]
pub(crate) struct ScopeView<'t> {
    layers: Vec<&'t BTreeMap<String, OptionDescriptor>>,
}

impl<'t> ScopeView<'t> {
    pub fn globals(options: &'t BTreeMap<String, OptionDescriptor>) -> Self {
        Self {
            layers: vec![options],
        }
    }

    /// Options of every command on the path; nearer declarations shadow outer ones.
    pub fn commands(chain: &[&'t CommandDescriptor]) -> Self {
        Self {
            layers: chain.iter().rev().map(|cmd| cmd.options()).collect(),
        }
    }

    fn by_long(&self, switch: &str) -> Option<&'t OptionDescriptor> {
        self.layers
            .iter()
            .find_map(|layer| layer.values().find(|opt| opt.matches_long(switch)))
    }

    fn by_alias(&self, alias: char) -> Option<&'t OptionDescriptor> {
        self.layers
            .iter()
            .find_map(|layer| layer.values().find(|opt| opt.flags.alias == Some(alias)))
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanStop {
    /// All tokens consumed.
    End,
    /// Next token is not a switch.
    Positional,
    /// Next token looks like a switch this scope does not declare.
    Unknown(String),
    /// A `--` was consumed; carries every token after it.
    Terminator(Vec<String>),
    /// An undeclared `--help` or `-h` was consumed.
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanOutcome {
    pub consumed: usize,
    pub stop: ScanStop,
}

/// A switch whose value could not be read or converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidSwitch {
    pub option: String,
    pub reason: String,
}

/// Whether `token` would be read as a switch rather than a value.
///
/// A lone `-` and negative numbers are values.
pub(crate) fn looks_like_switch(token: &str) -> bool {
    if token == "--" || (token.starts_with("--") && token.len() > 2) {
        return true;
    }
    let mut chars = token.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Consumes leading switches of `tokens` that belong to `scope`.
pub(crate) fn scan_switches<'t>(
    scope: &ScopeView<'t>,
    tokens: &[String],
    supplied: &mut SuppliedOptions<'t>,
) -> Result<ScanOutcome, InvalidSwitch> {
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();

        if token == "--" {
            trace!("switch scan hit terminator at token {i}");
            return Ok(ScanOutcome {
                consumed: tokens.len(),
                stop: ScanStop::Terminator(tokens[i + 1..].to_vec()),
            });
        }

        if !looks_like_switch(token) {
            return Ok(stop_at(i, ScanStop::Positional));
        }

        let (descriptor, inline, negated) = if let Some(long) = token.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            match resolve_long(scope, name, inline.is_some()) {
                Some((descriptor, negated)) => (descriptor, inline, negated),
                None if name == "help" => return Ok(stop_at(i + 1, ScanStop::Help)),
                None => return Ok(stop_at(i, ScanStop::Unknown(token.to_string()))),
            }
        } else {
            let mut chars = token[1..].chars();
            let alias = match (chars.next(), chars.next()) {
                (Some(alias), None) => alias,
                _ => return Ok(stop_at(i, ScanStop::Unknown(token.to_string()))),
            };
            match scope.by_alias(alias) {
                Some(descriptor) => (descriptor, None, false),
                None if alias == 'h' => return Ok(stop_at(i + 1, ScanStop::Help)),
                None => return Ok(stop_at(i, ScanStop::Unknown(token.to_string()))),
            }
        };

        let invalid = |reason: String| InvalidSwitch {
            option: descriptor.canonical_name(),
            reason,
        };

        let (raw, value) = if negated {
            (token.to_string(), Value::Boolean(false))
        } else if !descriptor.value_type.takes_value() {
            match inline {
                Some(raw) => (raw.to_string(), descriptor.value_type.coerce(raw).map_err(invalid)?),
                None if descriptor.value_type == ValueType::Count => {
                    (token.to_string(), Value::Integer(1))
                }
                None => (token.to_string(), Value::Boolean(true)),
            }
        } else {
            let raw = match inline {
                Some(raw) => raw.to_string(),
                None => match tokens.get(i + 1) {
                    Some(next) if !looks_like_switch(next) => {
                        i += 1;
                        next.clone()
                    }
                    _ => return Err(invalid("missing value".to_string())),
                },
            };
            let value = descriptor.value_type.coerce(&raw).map_err(invalid)?;
            (raw, value)
        };

        trace!(option = %descriptor.name, raw = %raw, "consumed switch");
        supplied.record(descriptor, &raw, value);
        i += 1;
    }

    Ok(stop_at(tokens.len(), ScanStop::End))
}

/// Matches `--name`, falling back to `--no-name` for boolean options.
fn resolve_long<'t>(
    scope: &ScopeView<'t>,
    name: &str,
    has_inline: bool,
) -> Option<(&'t OptionDescriptor, bool)> {
    if let Some(descriptor) = scope.by_long(name) {
        return Some((descriptor, false));
    }
    let positive = name.strip_prefix("no-")?;
    scope
        .by_long(positive)
        .filter(|opt| opt.value_type == ValueType::Boolean && !has_inline)
        .map(|opt| (opt, true))
}

fn stop_at(consumed: usize, stop: ScanStop) -> ScanOutcome {
    ScanOutcome { consumed, stop }
}
