//! Handler registry, pre-dispatch hook and the dispatcher that ties them to
//! the resolver.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use command_tree_core::{CommandDescriptor, CommandTree};
use tracing::{debug, warn};

use crate::error::{DispatchError, ParseFailure, ParseFailureKind, Result};
use crate::options::ResolvedOptions;
use crate::resolve::{DispatchDecision, HelpRequest, Resolution, resolve};

type Handler<O> = Box<dyn Fn(&[String], &ResolvedOptions) -> O + Send + Sync>;

/// Name → handler mapping, filled once at startup.
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandSpec, TreeBuilder};
/// use command_tree_dispatch::HandlerRegistry;
///
/// let mut builder = TreeBuilder::new();
/// builder.add_command(CommandSpec::new("ping"));
/// builder.add_command(CommandSpec::new("pong"));
/// let tree = builder.build().unwrap();
///
/// let mut handlers: HandlerRegistry<String> = HandlerRegistry::new();
/// handlers.register("ping", |_argv, _options| "pong".to_string());
///
/// assert!(handlers.contains("ping"));
/// assert_eq!(handlers.missing_targets(&tree), vec!["pong".to_string()]);
/// ```
pub struct HandlerRegistry<O> {
    handlers: BTreeMap<String, Handler<O>>,
}

impl<O> HandlerRegistry<O> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the handler for `target`.
    pub fn register<F>(&mut self, target: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&[String], &ResolvedOptions) -> O + Send + Sync + 'static,
    {
        self.handlers.insert(target.into(), Box::new(handler));
        self
    }

    pub fn contains(&self, target: &str) -> bool {
        self.handlers.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Targets named anywhere in `tree` that have no registered handler, sorted.
    pub fn missing_targets(&self, tree: &CommandTree) -> Vec<String> {
        let mut targets = BTreeSet::new();
        let mut stack: Vec<&CommandDescriptor> = tree.commands().values().collect();
        while let Some(command) = stack.pop() {
            if !self.contains(command.target()) {
                targets.insert(command.target().to_string());
            }
            stack.extend(command.subcommands().values());
        }
        targets.into_iter().collect()
    }

    fn call(&self, target: &str, argv: &[String], options: &ResolvedOptions) -> Option<O> {
        self.handlers.get(target).map(|handler| handler(argv, options))
    }
}

impl<O> Default for HandlerRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for HandlerRegistry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Interception step run after resolution and before the handler.
///
/// The hook may rewrite the resolved options or reject the invocation; a
/// rejection is reported as a [`ParseFailure`] of kind
/// [`PreDispatch`](ParseFailureKind::PreDispatch).
pub trait PreDispatch: Send + Sync {
    fn pre_dispatch(
        &self,
        command: &CommandDescriptor,
        argv: &[String],
        options: ResolvedOptions,
    ) -> std::result::Result<ResolvedOptions, String>;
}

impl<F> PreDispatch for F
where
    F: Fn(&CommandDescriptor, &[String], ResolvedOptions) -> std::result::Result<ResolvedOptions, String>
        + Send
        + Sync,
{
    fn pre_dispatch(
        &self,
        command: &CommandDescriptor,
        argv: &[String],
        options: ResolvedOptions,
    ) -> std::result::Result<ResolvedOptions, String> {
        self(command, argv, options)
    }
}

/// What a successful [`Dispatcher::run`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<O> {
    /// The handler ran and returned this value.
    Handled(O),
    /// Help was requested; rendering is left to the host.
    Help(HelpRequest),
}

/// Resolves argument vectors and invokes the matching handler.
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandSpec, OptionDescriptor, TreeBuilder};
/// use command_tree_dispatch::{Dispatcher, HandlerRegistry, Outcome};
///
/// let mut builder = TreeBuilder::new();
/// builder.register_option(&[], OptionDescriptor::boolean("verbose").alias('v')).unwrap();
/// builder.add_command(CommandSpec::new("ping"));
/// let tree = builder.build().unwrap();
///
/// let mut handlers = HandlerRegistry::new();
/// handlers.register("ping", |_argv, options| {
///     if options.get_bool("verbose") == Some(true) { "PONG" } else { "pong" }
/// });
///
/// let dispatcher = Dispatcher::new(tree, handlers);
/// assert_eq!(dispatcher.run(&["-v", "ping"]).unwrap(), Outcome::Handled("PONG"));
/// ```
pub struct Dispatcher<O> {
    tree: CommandTree,
    handlers: HandlerRegistry<O>,
    hook: Option<Box<dyn PreDispatch>>,
}

impl<O> Dispatcher<O> {
    pub fn new(tree: CommandTree, handlers: HandlerRegistry<O>) -> Self {
        let missing = handlers.missing_targets(&tree);
        if !missing.is_empty() {
            warn!(targets = ?missing, "command targets without handlers");
        }
        Self {
            tree,
            handlers,
            hook: None,
        }
    }

    /// Installs a closure as the pre-dispatch hook.
    pub fn with_pre_dispatch<F>(self, hook: F) -> Self
    where
        F: Fn(&CommandDescriptor, &[String], ResolvedOptions) -> std::result::Result<ResolvedOptions, String>
            + Send
            + Sync
            + 'static,
    {
        self.with_hook(hook)
    }

    /// Installs any [`PreDispatch`] implementation as the hook.
    pub fn with_hook<H: PreDispatch + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn handlers(&self) -> &HandlerRegistry<O> {
        &self.handlers
    }

    /// Resolves `argv` and runs the matching handler.
    pub fn run<S: AsRef<str>>(&self, argv: &[S]) -> Result<Outcome<O>> {
        match resolve(&self.tree, argv)? {
            Resolution::Help(request) => Ok(Outcome::Help(request)),
            Resolution::Dispatch(decision) => self.dispatch(decision).map(Outcome::Handled),
        }
    }

    /// Runs the hook and handler for an already resolved decision.
    pub fn dispatch(&self, decision: DispatchDecision) -> Result<O> {
        let DispatchDecision {
            target,
            command_path,
            residual_argv,
            options,
        } = decision;

        let not_found = || DispatchError::HandlerNotFound {
            target: target.clone(),
            command: command_path.join(" "),
        };
        let command = self.tree.lookup(&command_path).ok_or_else(not_found)?;
        if !self.handlers.contains(&target) {
            return Err(not_found());
        }

        let options = match &self.hook {
            Some(hook) => hook
                .pre_dispatch(command, &residual_argv, options)
                .map_err(|reason| {
                    ParseFailure::new(ParseFailureKind::PreDispatch, reason, &command_path)
                })?,
            None => options,
        };

        debug!(target = %target, argv = ?residual_argv, "invoking handler");
        self.handlers
            .call(&target, &residual_argv, &options)
            .ok_or_else(not_found)
    }
}

impl<O> fmt::Debug for Dispatcher<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tree", &self.tree)
            .field("handlers", &self.handlers)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
