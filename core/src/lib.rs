//! Command and option descriptors for declarative command-line toolkits.
//!
//! This crate defines the static half of a command-line application: the
//! tree of commands, their switches and positional arguments, and the rules
//! for building that tree safely.
//!
//! - [`OptionDescriptor`]: a switch or positional argument with its value
//!   type, help text and flags (required, default, alias, transform, hidden,
//!   accumulate).
//! - [`CommandSpec`] / [`CommandDescriptor`]: build-phase and frozen forms
//!   of a command node.
//! - [`TreeBuilder`] / [`CommandTree`]: path-addressed registration and the
//!   read-only tree handed to the resolver.
//! - [`OptionOverrides`]: per-import overrides for abstract options shared
//!   by several scopes.
//! - [`TreeManifest`]: JSON/YAML description of a tree.
//!
//! Malformed definitions (duplicate names, bad aliases, unknown flags) are
//! reported as [`BuildError`]s when the tree is built, never while parsing.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//!
//! let mut builder = TreeBuilder::new();
//! builder.register_option(&[], OptionDescriptor::boolean("verbose").alias('v'))?;
//! builder.add_command(
//!     CommandSpec::new("hello")
//!         .with_argument(OptionDescriptor::string("name").required())
//!         .with_option(OptionDescriptor::string("greeting").default_value("Hello")),
//! );
//! let tree = builder.build()?;
//!
//! let hello = tree.lookup(&["hello"]).unwrap();
//! assert_eq!(hello.arguments().len(), 1);
//! assert_eq!(hello.option("greeting").unwrap().flags.default, Some(Value::from("Hello")));
//! # Ok::<(), BuildError>(())
//! ```

mod command;
mod error;
mod manifest;
mod option;
mod transform;
mod tree;
mod validate;
mod value;

pub use command::{CommandDescriptor, CommandSpec, OptionImport};
pub use error::{BuildError, GLOBAL_SCOPE, Result};
pub use manifest::{CommandEntry, OptionEntry, TreeManifest};
pub use option::{FlagKey, OptionDescriptor, OptionFlags, OptionOverrides};
pub use transform::{Transform, TransformRegistry};
pub use tree::{CommandTree, TreeBuilder};
pub use validate::{RESERVED_HELP, validate_command_names, validate_option, validate_scope};
pub use value::{Value, ValueType};
