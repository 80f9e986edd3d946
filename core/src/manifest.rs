//! Declarative tree manifests.
//!
//! A [`TreeManifest`] describes a command tree as JSON or YAML data. Option
//! entries carry their flags as a flat key/value map, so unknown flag keys are
//! caught and reported as [`BuildError::UnknownFlag`] rather than silently
//! ignored. Transforms are referenced by name and bound through a
//! [`TransformRegistry`].
//!
//! # Example YAML
//!
//! ```yaml
//! options:
//!   format: { type: string, default: json, alias: f }
//! global_options:
//!   verbose: { type: boolean, alias: v }
//! commands:
//!   hello:
//!     arguments:
//!       - { name: name, type: string, required: true }
//!     options:
//!       greeting: { type: string, default: Hello }
//!   keys:
//!     subcommands:
//!       set:
//!         options:
//!           key: { type: string, required: true }
//!           value: { type: string, required: true, transform: trim }
//!           format: { import: format, help: Output format }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::{
    CommandSpec, CommandTree, FlagKey, OptionDescriptor, OptionOverrides, TransformRegistry,
    TreeBuilder, Value, ValueType,
};

/// Serializable description of a whole command tree.
///
/// # Examples
///
/// ```
/// use command_tree_core::{TransformRegistry, TreeManifest};
///
/// let manifest = TreeManifest::from_json_str(r#"{
///     "global_options": { "verbose": { "type": "boolean", "alias": "v" } },
///     "commands": { "ping": { "help": "Check connectivity" } }
/// }"#).unwrap();
///
/// let tree = manifest.build(&TransformRegistry::with_builtins()).unwrap();
/// assert_eq!(tree.lookup(&["ping"]).unwrap().help(), Some("Check connectivity"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeManifest {
    /// Abstract options available for import.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub global_options: BTreeMap<String, OptionEntry>,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandEntry>,
}

/// Manifest form of a command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandEntry {
    pub target: Option<String>,
    pub help: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionEntry>,
    /// Positional arguments; each entry must carry a `name`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<OptionEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommands: BTreeMap<String, CommandEntry>,
}

/// Manifest form of an option or positional argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Only used by positional arguments; map keys name options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Name of an abstract option to import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    /// Remaining keys, each of which must be a [`FlagKey`].
    #[serde(flatten)]
    pub flags: BTreeMap<String, serde_json::Value>,
}

impl TreeManifest {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| BuildError::Manifest(err.to_string()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|err| BuildError::Manifest(err.to_string()))
    }

    /// Reads a manifest file; `.yaml`/`.yml` files are YAML, anything else JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            BuildError::Manifest(format!("failed to read '{}': {err}", path.display()))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&raw),
            _ => Self::from_json_str(&raw),
        }
    }

    /// Builds and validates the described tree.
    pub fn build(&self, transforms: &TransformRegistry) -> Result<CommandTree> {
        let mut abstracts: BTreeMap<&str, ValueType> = BTreeMap::new();
        let mut builder = TreeBuilder::new();

        for (name, entry) in &self.options {
            let option = entry.to_descriptor(name, transforms)?;
            abstracts.insert(name.as_str(), option.value_type);
            builder.define_option(option)?;
        }

        for (name, entry) in &self.global_options {
            match entry.to_import(name, &abstracts, transforms)? {
                Some((import, overrides)) => {
                    builder.import_option(&[], import, overrides)?;
                }
                None => {
                    builder.register_option(&[], entry.to_descriptor(name, transforms)?)?;
                }
            }
        }

        for (name, entry) in &self.commands {
            builder.add_command(entry.to_spec(name, &abstracts, transforms)?);
        }

        builder.build()
    }
}

impl CommandEntry {
    fn to_spec(
        &self,
        name: &str,
        abstracts: &BTreeMap<&str, ValueType>,
        transforms: &TransformRegistry,
    ) -> Result<CommandSpec> {
        let mut spec = CommandSpec::new(name);
        spec.target = self.target.clone();
        spec.help = self.help.clone();
        spec.hidden = self.hidden;

        for (option_name, entry) in &self.options {
            match entry.to_import(option_name, abstracts, transforms)? {
                Some((import, overrides)) => spec = spec.with_import(import, overrides),
                None => {
                    spec = spec.with_option(entry.to_descriptor(option_name, transforms)?)
                }
            }
        }

        for entry in &self.arguments {
            let arg_name = entry.name.as_deref().ok_or_else(|| {
                BuildError::Manifest(format!("positional argument of '{name}' has no name"))
            })?;
            spec = spec.with_argument(entry.to_descriptor(arg_name, transforms)?);
        }

        for (sub_name, sub) in &self.subcommands {
            spec = spec.with_subcommand(sub.to_spec(sub_name, abstracts, transforms)?);
        }

        Ok(spec)
    }
}

impl OptionEntry {
    /// Full descriptor for an entry that does not import.
    fn to_descriptor(&self, name: &str, transforms: &TransformRegistry) -> Result<OptionDescriptor> {
        if let Some(import) = &self.import {
            return Err(BuildError::Manifest(format!(
                "option '{name}' imports '{import}' where imports are not allowed"
            )));
        }
        let value_type = self.value_type.unwrap_or_default();
        let overrides = self.parse_flags(name, value_type, transforms)?;
        Ok(overrides.apply(&OptionDescriptor::new(name, value_type)))
    }

    /// Import reference and overrides, or `None` if this entry is not an import.
    fn to_import<'a>(
        &'a self,
        name: &str,
        abstracts: &BTreeMap<&str, ValueType>,
        transforms: &TransformRegistry,
    ) -> Result<Option<(&'a str, OptionOverrides)>> {
        let Some(import) = self.import.as_deref() else {
            return Ok(None);
        };
        let base_type = *abstracts
            .get(import)
            .ok_or_else(|| BuildError::UnknownAbstractOption(import.to_string()))?;
        if import != name {
            return Err(BuildError::Manifest(format!(
                "option '{name}' imports '{import}': imported options keep their name"
            )));
        }
        if let Some(declared) = self.value_type {
            if declared != base_type {
                return Err(BuildError::InvalidFlagValue {
                    option: name.to_string(),
                    flag: "type".to_string(),
                    reason: format!("imported option is {base_type}, cannot become {declared}"),
                });
            }
        }
        Ok(Some((import, self.parse_flags(name, base_type, transforms)?)))
    }

    fn parse_flags(
        &self,
        name: &str,
        value_type: ValueType,
        transforms: &TransformRegistry,
    ) -> Result<OptionOverrides> {
        let mut overrides = OptionOverrides::new();
        overrides.help = self.help.clone();

        for (key, raw) in &self.flags {
            let flag: FlagKey = key.parse().map_err(|flag| BuildError::UnknownFlag {
                option: name.to_string(),
                flag,
            })?;
            let invalid = |reason: &str| BuildError::InvalidFlagValue {
                option: name.to_string(),
                flag: flag.to_string(),
                reason: reason.to_string(),
            };

            match flag {
                FlagKey::Required => {
                    overrides.required = Some(raw.as_bool().ok_or_else(|| invalid("expected a boolean"))?)
                }
                FlagKey::Hidden => {
                    overrides.hidden = Some(raw.as_bool().ok_or_else(|| invalid("expected a boolean"))?)
                }
                FlagKey::Accumulate => {
                    overrides.accumulate =
                        Some(raw.as_bool().ok_or_else(|| invalid("expected a boolean"))?)
                }
                FlagKey::Default => {
                    overrides.default = Some(
                        json_to_value(raw, value_type)
                            .ok_or_else(|| invalid("expected a scalar or a list of scalars"))?,
                    )
                }
                FlagKey::Alias => {
                    let alias = raw.as_str().ok_or_else(|| invalid("expected a string"))?;
                    let mut chars = alias.chars();
                    match (chars.next(), chars.next()) {
                        (Some(letter), None) => overrides.alias = Some(letter),
                        _ => {
                            return Err(BuildError::InvalidAlias {
                                option: name.to_string(),
                                alias: alias.to_string(),
                            });
                        }
                    }
                }
                FlagKey::Transform => {
                    let (transform_name, args) = transform_reference(raw)
                        .ok_or_else(|| invalid("expected a name or {name, args}"))?;
                    let transform = transforms.resolve(&transform_name, args).ok_or_else(|| {
                        BuildError::UnknownTransform {
                            option: name.to_string(),
                            transform: transform_name.clone(),
                        }
                    })?;
                    overrides.transform = Some(transform);
                }
            }
        }

        Ok(overrides)
    }
}

/// Accepts `"name"` or `{ "name": "...", "args": [...] }`.
fn transform_reference(raw: &serde_json::Value) -> Option<(String, Vec<Value>)> {
    match raw {
        serde_json::Value::String(name) => Some((name.clone(), Vec::new())),
        serde_json::Value::Object(map) => {
            let name = map.get("name")?.as_str()?.to_string();
            let args = match map.get("args") {
                None => Vec::new(),
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(|item| json_to_value(item, ValueType::String))
                    .collect::<Option<Vec<_>>>()?,
                Some(_) => return None,
            };
            Some((name, args))
        }
        _ => None,
    }
}

/// Converts manifest data into a [`Value`], widening integers for float options.
fn json_to_value(raw: &serde_json::Value, value_type: ValueType) -> Option<Value> {
    match raw {
        serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
        serde_json::Value::Number(n) => match (value_type, n.as_i64()) {
            (ValueType::Float, _) | (_, None) => n.as_f64().map(Value::Float),
            (_, Some(i)) => Some(Value::Integer(i)),
        },
        serde_json::Value::String(s) => Some(Value::String(s.clone())),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| json_to_value(item, value_type))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        serde_json::Value::Null | serde_json::Value::Object(_) => None,
    }
}
