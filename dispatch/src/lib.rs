//! Argument resolution and handler dispatch over a [`CommandTree`].
//!
//! [`resolve`] walks a raw argument vector through the tree and produces a
//! [`Resolution`]: either a [`DispatchDecision`] naming the handler, the
//! command path, the residual argv and the final option values, or a
//! [`HelpRequest`]. Failures come back as a [`ParseFailure`] tagged with a
//! [`ParseFailureKind`].
//!
//! [`Dispatcher`] pairs a tree with a [`HandlerRegistry`] and an optional
//! [`PreDispatch`] hook, and runs the matching handler.
//!
//! [`CommandTree`]: command_tree_core::CommandTree
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//! use command_tree_dispatch::{resolve, Resolution};
//!
//! let mut builder = TreeBuilder::new();
//! builder.register_option(&[], OptionDescriptor::boolean("verbose").alias('v'))?;
//! builder.add_command(CommandSpec::new("exec"));
//! let tree = builder.build()?;
//!
//! let Resolution::Dispatch(decision) = resolve(&tree, &["-v", "exec", "ls", "-la"]).unwrap() else {
//!     panic!("expected a dispatch decision");
//! };
//! assert_eq!(decision.target, "exec");
//! assert_eq!(decision.residual_argv, vec!["ls", "-la"]);
//! assert_eq!(decision.options.get_bool("verbose"), Some(true));
//! # Ok::<(), BuildError>(())
//! ```

mod dispatcher;
mod error;
mod finalize;
mod options;
mod resolve;
mod scan;

pub use dispatcher::{Dispatcher, HandlerRegistry, Outcome, PreDispatch};
pub use error::{DispatchError, ParseFailure, ParseFailureKind, Result};
pub use options::ResolvedOptions;
pub use resolve::{DispatchDecision, HelpRequest, Resolution, resolve};
