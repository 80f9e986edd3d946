//! Resolution of a raw argument vector against a [`CommandTree`].
//!
//! Resolution runs in two phases:
//!
//! 1. **Global prefix.** Leading switches are matched against the global
//!    options only. The first non-switch token is the command candidate; with
//!    no candidate the result is a top-level help request.
//! 2. **Tree descent.** Each further token is, in order of precedence: a
//!    subcommand of the current command, the word `help`, the value of the
//!    next unconsumed positional argument, or the start of the residual argv
//!    handed to the handler untouched. Between steps the switches of the
//!    commands on the current path are scanned.
//!
//! Once the walk ends, [`finalize`](crate::finalize) transforms supplied
//! values, backfills defaults and enforces required options.

use std::collections::VecDeque;

use command_tree_core::{CommandDescriptor, CommandTree, OptionDescriptor, RESERVED_HELP};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParseFailure, ParseFailureKind};
use crate::finalize::finalize;
use crate::options::ResolvedOptions;
use crate::scan::{
    InvalidSwitch, ScanStop, ScopeView, SuppliedOptions, looks_like_switch, scan_switches,
};

/// A fully resolved invocation, ready to hand to its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchDecision {
    /// Handler name of the leaf command.
    pub target: String,
    /// Command names from the top level down to the leaf.
    pub command_path: Vec<String>,
    /// Tokens left to the handler, including everything after a `--`.
    pub residual_argv: Vec<String>,
    pub options: ResolvedOptions,
}

/// Request to show help for a command path (empty for top-level help).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpRequest {
    pub path: Vec<String>,
}

/// Successful outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Resolution {
    Dispatch(DispatchDecision),
    Help(HelpRequest),
}

/// Resolves `argv` (program name already stripped) against `tree`.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
/// use command_tree_dispatch::{resolve, ParseFailureKind, Resolution};
///
/// let mut builder = TreeBuilder::new();
/// builder.add_command(
///     CommandSpec::new("hello")
///         .with_argument(OptionDescriptor::string("name").required())
///         .with_option(OptionDescriptor::string("greeting").default_value("Hello")),
/// );
/// let tree = builder.build().unwrap();
///
/// let Resolution::Dispatch(decision) = resolve(&tree, &["hello", "Ada"]).unwrap() else {
///     panic!("expected a dispatch decision");
/// };
/// assert_eq!(decision.target, "hello");
/// assert!(decision.residual_argv.is_empty());
/// assert_eq!(decision.options.get_str("name"), Some("Ada"));
/// assert_eq!(decision.options.get_str("greeting"), Some("Hello"));
///
/// let failure = resolve(&tree, &["hello"]).unwrap_err();
/// assert_eq!(failure.kind, ParseFailureKind::MissingRequiredOption);
/// ```
pub fn resolve<S: AsRef<str>>(tree: &CommandTree, argv: &[S]) -> Result<Resolution, ParseFailure> {
    let tokens: Vec<String> = argv.iter().map(|token| token.as_ref().to_string()).collect();
    Resolver::new(tree).run(&tokens)
}

struct Resolver<'t> {
    tree: &'t CommandTree,
    supplied: SuppliedOptions<'t>,
    chain: Vec<&'t CommandDescriptor>,
    pending: VecDeque<&'t OptionDescriptor>,
}

impl<'t> Resolver<'t> {
    fn new(tree: &'t CommandTree) -> Self {
        Self {
            tree,
            supplied: SuppliedOptions::default(),
            chain: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    fn path(&self) -> Vec<String> {
        self.chain.iter().map(|cmd| cmd.name().to_string()).collect()
    }

    fn failure(&self, kind: ParseFailureKind, message: String) -> ParseFailure {
        ParseFailure::new(kind, message, &self.path())
    }

    fn invalid(&self, err: InvalidSwitch) -> ParseFailure {
        self.failure(
            ParseFailureKind::InvalidValue,
            format!("invalid value for {}: {}", err.option, err.reason),
        )
        .with_option(err.option)
    }

    fn help(&self) -> Resolution {
        Resolution::Help(HelpRequest { path: self.path() })
    }

    fn run(mut self, tokens: &[String]) -> Result<Resolution, ParseFailure> {
        let globals = ScopeView::globals(self.tree.global_options());
        let outcome = scan_switches(&globals, tokens, &mut self.supplied)
            .map_err(|err| self.invalid(err))?;

        match outcome.stop {
            ScanStop::End | ScanStop::Help | ScanStop::Terminator(_) => {
                debug!("no command given, showing top-level help");
                return Ok(self.help());
            }
            ScanStop::Unknown(switch) => {
                return Err(self
                    .failure(
                        ParseFailureKind::UnknownGlobalOption,
                        format!("unknown global option {switch}"),
                    )
                    .with_option(switch));
            }
            ScanStop::Positional => {}
        }

        let rest = &tokens[outcome.consumed..];
        if rest[0] == RESERVED_HELP {
            return self.help_for(&rest[1..]);
        }
        self.descend(rest)
    }

    fn descend(mut self, rest: &[String]) -> Result<Resolution, ParseFailure> {
        let mut i = 0;
        let mut residual: Vec<String> = Vec::new();
        let mut passthrough: Vec<String> = Vec::new();

        while i < rest.len() || !self.chain.is_empty() {
            if !self.chain.is_empty() {
                let scope = ScopeView::commands(&self.chain);
                let outcome = scan_switches(&scope, &rest[i..], &mut self.supplied)
                    .map_err(|err| self.invalid(err))?;
                i += outcome.consumed;
                match outcome.stop {
                    ScanStop::End | ScanStop::Positional => {}
                    ScanStop::Terminator(after) => {
                        debug!(count = after.len(), "pass-through after --");
                        passthrough = after;
                    }
                    ScanStop::Help => return Ok(self.help()),
                    ScanStop::Unknown(switch) => {
                        if self.accepts_residual() {
                            residual = rest[i..].to_vec();
                            break;
                        }
                        return Err(self
                            .failure(
                                ParseFailureKind::UnknownOption,
                                format!("unknown option {switch}"),
                            )
                            .with_option(switch));
                    }
                }
            }

            let Some(token) = rest.get(i) else {
                break;
            };

            let subcommand = match self.chain.last().copied() {
                Some(current) => current.subcommand(token),
                None => self.tree.command(token),
            };
            if let Some(next) = subcommand {
                debug!(command = %next.name(), "descending into command");
                self.chain.push(next);
                self.pending = next.arguments().iter().collect();
                i += 1;
                continue;
            }

            if token == RESERVED_HELP {
                return Ok(self.help());
            }

            if let Some(argument) = self.pending.pop_front() {
                let value = argument.value_type.coerce(token).map_err(|reason| {
                    self.failure(
                        ParseFailureKind::InvalidValue,
                        format!("invalid value for {}: {reason}", argument.argument_name()),
                    )
                    .with_option(argument.argument_name())
                })?;
                debug!(argument = %argument.name, raw = %token, "consumed positional argument");
                self.supplied.record_argument(argument, token, value);
                i += 1;
                continue;
            }

            match self.chain.last() {
                None => {
                    return Err(self.failure(
                        ParseFailureKind::UnknownCommand,
                        format!("unknown command '{token}'"),
                    ));
                }
                Some(current) if !current.subcommands().is_empty() => {
                    return Err(self.failure(
                        ParseFailureKind::UnknownSubcommand,
                        format!("unknown subcommand '{token}' for '{}'", self.path().join(" ")),
                    ));
                }
                Some(_) => {
                    residual = rest[i..].to_vec();
                    break;
                }
            }
        }

        let Some(leaf) = self.chain.last().copied() else {
            return Ok(self.help());
        };

        let path = self.path();
        residual.extend(passthrough);
        let options = finalize(self.tree, &self.chain, self.supplied, &path)?;
        debug!(target = %leaf.target(), path = %path.join(" "), "dispatch decision reached");

        Ok(Resolution::Dispatch(DispatchDecision {
            target: leaf.target().to_string(),
            command_path: path,
            residual_argv: residual,
            options,
        }))
    }

    /// Leaf with nothing left to consume hands unrecognized tokens to its handler.
    fn accepts_residual(&self) -> bool {
        self.pending.is_empty()
            && self
                .chain
                .last()
                .is_some_and(|current| current.subcommands().is_empty())
    }

    /// Validates the path named after `help` and returns it as a help request.
    fn help_for(mut self, names: &[String]) -> Result<Resolution, ParseFailure> {
        for name in names.iter().take_while(|name| !looks_like_switch(name)) {
            let next = match self.chain.last().copied() {
                Some(current) => current.subcommand(name),
                None => self.tree.command(name),
            };
            match next {
                Some(next) => self.chain.push(next),
                None if self.chain.is_empty() => {
                    return Err(self.failure(
                        ParseFailureKind::UnknownCommand,
                        format!("unknown command '{name}'"),
                    ));
                }
                None => {
                    return Err(self.failure(
                        ParseFailureKind::UnknownSubcommand,
                        format!("unknown subcommand '{name}' for '{}'", self.path().join(" ")),
                    ));
                }
            }
        }
        Ok(self.help())
    }
}
