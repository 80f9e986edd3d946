//! Option descriptors: switches and positional arguments.

use std::fmt;
use std::str::FromStr;

use crate::{Transform, Value, ValueType};

/// Behavioural flags attached to an [`OptionDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct OptionFlags {
    /// Resolution fails when no value is supplied, inherited or defaulted.
    pub required: bool,
    /// Value used when none is supplied. Never transformed.
    pub default: Option<Value>,
    /// Single-letter shorthand (`-v`).
    pub alias: Option<char>,
    /// Conversion applied once to each supplied value.
    pub transform: Option<Transform>,
    /// Omitted from help listings.
    pub hidden: bool,
    /// Collect every occurrence into a list instead of keeping the last.
    pub accumulate: bool,
}

/// Declaration of a single switch or positional argument.
///
/// The same type describes both; a descriptor becomes positional by being
/// registered in a command's argument list.
///
/// # Examples
///
/// ```
/// use command_tree_core::{OptionDescriptor, Value, ValueType};
///
/// let verbose = OptionDescriptor::boolean("verbose")
///     .alias('v')
///     .with_help("Print more output");
/// assert_eq!(verbose.value_type, ValueType::Boolean);
/// assert_eq!(verbose.canonical_name(), "--verbose");
/// assert_eq!(verbose.flags.alias, Some('v'));
///
/// let dry_run = OptionDescriptor::boolean("dry_run").default_value(false);
/// assert_eq!(dry_run.canonical_name(), "--dry-run");
/// assert_eq!(dry_run.flags.default, Some(Value::Boolean(false)));
/// ```
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub help: Option<String>,
    pub flags: OptionFlags,
}

impl OptionDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            help: None,
            flags: OptionFlags::default(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    pub fn count(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Count)
    }

    pub fn repeated(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Repeated)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.flags.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.flags.default = Some(value.into());
        self
    }

    pub fn alias(mut self, alias: char) -> Self {
        self.flags.alias = Some(alias);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.flags.transform = Some(transform);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.flags.hidden = true;
        self
    }

    pub fn accumulate(mut self) -> Self {
        self.flags.accumulate = true;
        self
    }

    /// Whether supplied values collect into a list.
    pub fn accumulates(&self) -> bool {
        self.flags.accumulate || self.value_type.always_accumulates()
    }

    /// The `--long-form` of this option as typed on the command line.
    pub fn canonical_name(&self) -> String {
        format!("--{}", self.name.replace('_', "-"))
    }

    /// The `<name>` form used when this descriptor is a positional argument.
    pub fn argument_name(&self) -> String {
        format!("<{}>", self.name)
    }

    /// Whether `switch` (without leading dashes) names this option.
    pub fn matches_long(&self, switch: &str) -> bool {
        switch == self.name || switch.replace('-', "_") == self.name.replace('-', "_")
    }
}

/// The closed set of flag keys an option declaration may carry.
///
/// ```
/// use command_tree_core::FlagKey;
///
/// assert_eq!("alias".parse::<FlagKey>(), Ok(FlagKey::Alias));
/// assert!("colour".parse::<FlagKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    Required,
    Default,
    Alias,
    Transform,
    Hidden,
    Accumulate,
}

impl FlagKey {
    pub const ALL: [FlagKey; 6] = [
        FlagKey::Required,
        FlagKey::Default,
        FlagKey::Alias,
        FlagKey::Transform,
        FlagKey::Hidden,
        FlagKey::Accumulate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlagKey::Required => "required",
            FlagKey::Default => "default",
            FlagKey::Alias => "alias",
            FlagKey::Transform => "transform",
            FlagKey::Hidden => "hidden",
            FlagKey::Accumulate => "accumulate",
        }
    }
}

impl FromStr for FlagKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlagKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-import overrides for an abstract option.
///
/// `help` replaces the base help text; every other field that is set
/// replaces the matching flag of the base descriptor, leaving unset flags
/// untouched. The value type cannot be overridden.
///
/// # Examples
///
/// ```
/// use command_tree_core::{OptionDescriptor, OptionOverrides};
///
/// let base = OptionDescriptor::string("format").alias('f').default_value("json");
/// let imported = OptionOverrides::new().help("Output format").required(true).apply(&base);
///
/// assert_eq!(imported.help.as_deref(), Some("Output format"));
/// assert!(imported.flags.required);
/// assert_eq!(imported.flags.alias, Some('f'));
/// assert!(!base.flags.required);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub help: Option<String>,
    pub required: Option<bool>,
    pub default: Option<Value>,
    pub alias: Option<char>,
    pub transform: Option<Transform>,
    pub hidden: Option<bool>,
    pub accumulate: Option<bool>,
}

impl OptionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn accumulate(mut self, accumulate: bool) -> Self {
        self.accumulate = Some(accumulate);
        self
    }

    /// Produces an independent descriptor from `base` with these overrides.
    pub fn apply(&self, base: &OptionDescriptor) -> OptionDescriptor {
        let mut imported = base.clone();
        if let Some(help) = &self.help {
            imported.help = Some(help.clone());
        }

        let flags = &mut imported.flags;
        if let Some(required) = self.required {
            flags.required = required;
        }
        if let Some(default) = &self.default {
            flags.default = Some(default.clone());
        }
        if let Some(alias) = self.alias {
            flags.alias = Some(alias);
        }
        if let Some(transform) = &self.transform {
            flags.transform = Some(transform.clone());
        }
        if let Some(hidden) = self.hidden {
            flags.hidden = hidden;
        }
        if let Some(accumulate) = self.accumulate {
            flags.accumulate = accumulate;
        }
        imported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_merge_key_by_key() {
        let base = OptionDescriptor::integer("limit")
            .with_help("Maximum rows")
            .default_value(10)
            .alias('l')
            .hidden();

        let imported = OptionOverrides::new().default_value(50).apply(&base);

        assert_eq!(imported.value_type, ValueType::Integer);
        assert_eq!(imported.help.as_deref(), Some("Maximum rows"));
        assert_eq!(imported.flags.default, Some(Value::Integer(50)));
        assert_eq!(imported.flags.alias, Some('l'));
        assert!(imported.flags.hidden);
    }

    #[test]
    fn test_imports_are_independent_copies() {
        let base = OptionDescriptor::string("format");
        let mut first = OptionOverrides::new().apply(&base);
        let second = OptionOverrides::new().apply(&base);

        first.flags.required = true;
        first.help = Some("changed".to_string());

        assert!(!second.flags.required);
        assert!(!base.flags.required);
        assert!(base.help.is_none());
    }

    #[test]
    fn test_repeated_type_always_accumulates() {
        assert!(OptionDescriptor::repeated("tag").accumulates());
        assert!(OptionDescriptor::string("tag").accumulate().accumulates());
        assert!(!OptionDescriptor::string("tag").accumulates());
    }

    #[test]
    fn test_matches_long_accepts_dash_and_underscore() {
        let opt = OptionDescriptor::boolean("dry_run");
        assert!(opt.matches_long("dry-run"));
        assert!(opt.matches_long("dry_run"));
        assert!(!opt.matches_long("dry"));
    }
}
