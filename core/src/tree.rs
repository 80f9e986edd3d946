//! The command tree and the path-addressed builder that produces it.

use std::collections::BTreeMap;

use crate::command::OptionImport;
use crate::error::{BuildError, GLOBAL_SCOPE, Result, scope_label};
use crate::validate::{validate_command_names, validate_option, validate_scope};
use crate::{CommandDescriptor, CommandSpec, OptionDescriptor, OptionOverrides};

const ABSTRACT_SCOPE: &str = "<abstract>";

/// The full, read-only set of registered commands and global options.
///
/// Produced by [`TreeBuilder::build`]; never mutated afterwards.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let mut builder = TreeBuilder::new();
/// builder
///     .register_option(&[], OptionDescriptor::boolean("verbose").alias('v'))?
///     .register_subcommand(&[], CommandSpec::new("keys"))?
///     .register_subcommand(&["keys"], CommandSpec::new("set"))?
///     .register_option(&["keys", "set"], OptionDescriptor::string("key").required())?;
/// let tree = builder.build()?;
///
/// let set = tree.lookup(&["keys", "set"]).unwrap();
/// assert_eq!(set.target(), "set");
/// assert!(set.option("key").unwrap().flags.required);
/// assert!(tree.global_option_by_alias('v').is_some());
/// assert!(tree.lookup(&["keys", "get"]).is_none());
/// # Ok::<(), BuildError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    global_options: BTreeMap<String, OptionDescriptor>,
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandTree {
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    pub fn global_options(&self) -> &BTreeMap<String, OptionDescriptor> {
        &self.global_options
    }

    pub fn global_option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.global_options.get(name)
    }

    pub fn global_option_by_alias(&self, alias: char) -> Option<&OptionDescriptor> {
        self.global_options
            .values()
            .find(|opt| opt.flags.alias == Some(alias))
    }

    /// Top-level commands keyed by name.
    pub fn commands(&self) -> &BTreeMap<String, CommandDescriptor> {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn visible_commands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values().filter(|cmd| !cmd.is_hidden())
    }

    /// Finds the command at `path`. The empty path names no command.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandDescriptor> {
        self.lookup_chain(path)?.pop()
    }

    /// Returns every command along `path`, outermost first.
    pub fn lookup_chain<S: AsRef<str>>(&self, path: &[S]) -> Option<Vec<&CommandDescriptor>> {
        let (first, rest) = path.split_first()?;
        let mut current = self.commands.get(first.as_ref())?;
        let mut chain = vec![current];
        for name in rest {
            current = current.subcommand(name.as_ref())?;
            chain.push(current);
        }
        Some(chain)
    }
}

/// Builder for [`CommandTree`].
///
/// Registration calls address their scope with an explicit path of command
/// names. The empty path is the root scope: options registered there are
/// global and subcommands registered there are top-level commands.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    abstract_options: BTreeMap<String, OptionDescriptor>,
    global_options: Vec<OptionDescriptor>,
    global_imports: Vec<OptionImport>,
    commands: Vec<CommandSpec>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an abstract option that command scopes may import.
    pub fn define_option(&mut self, option: OptionDescriptor) -> Result<&mut Self> {
        validate_option(&option)?;
        if self.abstract_options.contains_key(&option.name) {
            return Err(BuildError::DuplicateAbstractOption(option.name));
        }
        self.abstract_options.insert(option.name.clone(), option);
        Ok(self)
    }

    /// Registers a switch in the scope at `path`.
    pub fn register_option(&mut self, path: &[&str], option: OptionDescriptor) -> Result<&mut Self> {
        if path.is_empty() {
            self.global_options.push(option);
        } else {
            self.spec_at_mut(path)?.options.push(option);
        }
        Ok(self)
    }

    /// Appends a positional argument to the command at `path`.
    pub fn register_argument(
        &mut self,
        path: &[&str],
        argument: OptionDescriptor,
    ) -> Result<&mut Self> {
        if path.is_empty() {
            return Err(BuildError::RootArgument);
        }
        self.spec_at_mut(path)?.arguments.push(argument);
        Ok(self)
    }

    /// Adds a command under `path`.
    pub fn register_subcommand(&mut self, path: &[&str], command: CommandSpec) -> Result<&mut Self> {
        if path.is_empty() {
            self.commands.push(command);
        } else {
            self.spec_at_mut(path)?.subcommands.push(command);
        }
        Ok(self)
    }

    /// Imports the abstract option `name` into the scope at `path`.
    ///
    /// The import is resolved when the tree is built, so it may precede the
    /// matching [`define_option`](Self::define_option) call.
    pub fn import_option(
        &mut self,
        path: &[&str],
        name: &str,
        overrides: OptionOverrides,
    ) -> Result<&mut Self> {
        let import = OptionImport {
            name: name.to_string(),
            overrides,
        };
        if path.is_empty() {
            self.global_imports.push(import);
        } else {
            self.spec_at_mut(path)?.imports.push(import);
        }
        Ok(self)
    }

    /// Adds a fully assembled top-level command.
    pub fn add_command(&mut self, command: CommandSpec) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Validates every scope and freezes the tree.
    pub fn build(self) -> Result<CommandTree> {
        for option in self.abstract_options.values() {
            validate_option(option).map_err(|err| match err {
                BuildError::EmptyName(_) => BuildError::EmptyName(ABSTRACT_SCOPE.to_string()),
                other => other,
            })?;
        }

        let mut global_options = self.global_options;
        resolve_imports(&mut global_options, self.global_imports, &self.abstract_options)?;
        validate_scope(GLOBAL_SCOPE, &global_options, &[])?;

        validate_command_names(GLOBAL_SCOPE, &self.commands)?;
        let mut commands = BTreeMap::new();
        for spec in self.commands {
            let command = freeze(spec, &[], &self.abstract_options)?;
            commands.insert(command.name.clone(), command);
        }

        Ok(CommandTree {
            global_options: into_map(global_options),
            commands,
        })
    }

    fn spec_at_mut(&mut self, path: &[&str]) -> Result<&mut CommandSpec> {
        let unknown = || BuildError::UnknownPath(path.join(" "));
        let (first, rest) = path.split_first().ok_or_else(unknown)?;
        let mut current = self
            .commands
            .iter_mut()
            .find(|cmd| cmd.name == *first)
            .ok_or_else(unknown)?;
        for name in rest {
            current = current.find_subcommand_mut(name).ok_or_else(unknown)?;
        }
        Ok(current)
    }
}

fn freeze(
    spec: CommandSpec,
    parent: &[String],
    abstracts: &BTreeMap<String, OptionDescriptor>,
) -> Result<CommandDescriptor> {
    let mut path = parent.to_vec();
    path.push(spec.name.clone());
    let scope = scope_label(&path);

    let mut options = spec.options;
    resolve_imports(&mut options, spec.imports, abstracts)?;
    validate_scope(&scope, &options, &spec.arguments)?;
    validate_command_names(&scope, &spec.subcommands)?;

    let mut subcommands = BTreeMap::new();
    for sub in spec.subcommands {
        let sub = freeze(sub, &path, abstracts)?;
        subcommands.insert(sub.name.clone(), sub);
    }

    let name = spec.name;
    Ok(CommandDescriptor {
        target: spec.target.unwrap_or_else(|| name.clone()),
        name,
        help: spec.help,
        hidden: spec.hidden,
        options: into_map(options),
        arguments: spec.arguments,
        subcommands,
    })
}

fn resolve_imports(
    options: &mut Vec<OptionDescriptor>,
    imports: Vec<OptionImport>,
    abstracts: &BTreeMap<String, OptionDescriptor>,
) -> Result<()> {
    for import in imports {
        let base = abstracts
            .get(&import.name)
            .ok_or_else(|| BuildError::UnknownAbstractOption(import.name.clone()))?;
        options.push(import.overrides.apply(base));
    }
    Ok(())
}

fn into_map(options: Vec<OptionDescriptor>) -> BTreeMap<String, OptionDescriptor> {
    options
        .into_iter()
        .map(|opt| (opt.name.clone(), opt))
        .collect()
}
