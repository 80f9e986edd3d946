//! Command descriptors: the nodes of a command tree.
//!
//! [`CommandSpec`] is the mutable, build-phase form that definition code
//! assembles. [`CommandDescriptor`] is the validated, read-only node stored in
//! a [`CommandTree`](crate::CommandTree).

use std::collections::BTreeMap;

use crate::{OptionDescriptor, OptionOverrides};

/// Import of a named abstract option into a command scope.
#[derive(Debug, Clone)]
pub struct OptionImport {
    /// Name of the abstract option (see [`TreeBuilder::define_option`](crate::TreeBuilder::define_option)).
    pub name: String,
    pub overrides: OptionOverrides,
}

/// Build-phase definition of a command.
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandSpec, OptionDescriptor};
///
/// let keys = CommandSpec::new("keys")
///     .with_help("Manage keys")
///     .with_subcommand(
///         CommandSpec::new("set")
///             .with_option(OptionDescriptor::string("key").required())
///             .with_option(OptionDescriptor::string("value").required()),
///     );
///
/// assert_eq!(keys.subcommands.len(), 1);
/// assert_eq!(keys.subcommands[0].options.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub name: String,
    /// Handler name; defaults to `name`.
    pub target: Option<String>,
    pub help: Option<String>,
    pub hidden: bool,
    pub options: Vec<OptionDescriptor>,
    pub imports: Vec<OptionImport>,
    pub arguments: Vec<OptionDescriptor>,
    pub subcommands: Vec<CommandSpec>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_option(mut self, option: OptionDescriptor) -> Self {
        self.options.push(option);
        self
    }

    /// Imports a named abstract option with per-import overrides.
    pub fn with_import(mut self, name: impl Into<String>, overrides: OptionOverrides) -> Self {
        self.imports.push(OptionImport {
            name: name.into(),
            overrides,
        });
        self
    }

    pub fn with_argument(mut self, argument: OptionDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_subcommand(mut self, subcommand: CommandSpec) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub(crate) fn find_subcommand_mut(&mut self, name: &str) -> Option<&mut CommandSpec> {
        self.subcommands.iter_mut().find(|sub| sub.name == name)
    }
}

/// Validated, immutable command node.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub(crate) name: String,
    pub(crate) target: String,
    pub(crate) help: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) options: BTreeMap<String, OptionDescriptor>,
    pub(crate) arguments: Vec<OptionDescriptor>,
    pub(crate) subcommands: BTreeMap<String, CommandDescriptor>,
}

impl CommandDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the handler this command dispatches to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn options(&self) -> &BTreeMap<String, OptionDescriptor> {
        &self.options
    }

    /// Positional arguments in consumption order.
    pub fn arguments(&self) -> &[OptionDescriptor] {
        &self.arguments
    }

    pub fn subcommands(&self) -> &BTreeMap<String, CommandDescriptor> {
        &self.subcommands
    }

    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.get(name)
    }

    pub fn option_by_alias(&self, alias: char) -> Option<&OptionDescriptor> {
        self.options
            .values()
            .find(|opt| opt.flags.alias == Some(alias))
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandDescriptor> {
        self.subcommands.get(name)
    }

    /// Subcommands not flagged hidden, in name order.
    pub fn visible_subcommands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.subcommands.values().filter(|sub| !sub.hidden)
    }

    /// A command with neither subcommands nor arguments hands its trailing
    /// tokens to the handler untouched.
    pub fn is_passthrough(&self) -> bool {
        self.subcommands.is_empty() && self.arguments.is_empty()
    }
}
