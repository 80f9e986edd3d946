mod demo;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_tree_core::{CommandTree, TransformRegistry, TreeManifest};
use command_tree_dispatch::{DispatchError, Dispatcher, Outcome, resolve};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CMDTREE_LOG";

/// Serialization format for `resolve` output.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "cmdtree", version)]
#[command(about = "Resolve and dispatch argument vectors against a command tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve ARGV and print the dispatch decision or failure.
    Resolve(ResolveArgs),
    /// Dispatch ARGV to the built-in demo handlers.
    Run(RunArgs),
    /// Build a tree manifest and report definition errors.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Tree manifest (JSON, or YAML by extension). Defaults to the demo tree.
    #[arg(long)]
    tree: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to resolve, usually given after `--`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Arguments to dispatch, usually given after `--`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Tree manifest to validate.
    #[arg(long)]
    tree: PathBuf,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(args),
        Command::Run(args) => run_demo(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let tree = match &args.tree {
        Some(path) => load_tree(path)?,
        None => demo::tree().map_err(|err| err.to_string())?,
    };

    match resolve(&tree, &args.argv) {
        Ok(resolution) => {
            print!("{}", render(&resolution, args.format)?);
            Ok(())
        }
        Err(failure) => {
            print!("{}", render(&failure, args.format)?);
            Err(failure.to_string())
        }
    }
}

fn run_demo(args: RunArgs) -> Result<(), String> {
    let tree = demo::tree().map_err(|err| err.to_string())?;
    let dispatcher = Dispatcher::new(tree, demo::handlers()).with_pre_dispatch(demo::check_keys);

    match dispatcher.run(&args.argv) {
        Ok(Outcome::Handled(output)) => {
            println!("{}", output?);
            Ok(())
        }
        Ok(Outcome::Help(request)) => {
            print!("{}", render_help(dispatcher.tree(), &request.path)?);
            Ok(())
        }
        Err(DispatchError::Parse(failure)) => {
            debug!(kind = %failure.kind, path = ?failure.command_path, "parse failure");
            Err(failure.to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let tree = load_tree(&args.tree)?;
    let mut commands = 0;
    let mut stack: Vec<_> = tree.commands().values().collect();
    while let Some(command) = stack.pop() {
        commands += 1;
        stack.extend(command.subcommands().values());
    }
    println!(
        "Tree '{}' is valid: {} command(s), {} global option(s).",
        args.tree.display(),
        commands,
        tree.global_options().len()
    );
    Ok(())
}

fn load_tree(path: &Path) -> Result<CommandTree, String> {
    let manifest = TreeManifest::load(path).map_err(|err| err.to_string())?;
    manifest
        .build(&TransformRegistry::with_builtins())
        .map_err(|err| format!("invalid tree '{}': {err}", path.display()))
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|raw| raw + "\n")
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

/// Lists the visible subcommands, options and arguments at `path`.
fn render_help(tree: &CommandTree, path: &[String]) -> Result<String, String> {
    let mut out = String::new();
    let usage = if path.is_empty() {
        "cmdtree run [OPTIONS] <COMMAND>".to_string()
    } else {
        format!("cmdtree run {} [OPTIONS]", path.join(" "))
    };
    let _ = writeln!(out, "Usage: {usage}");

    let (commands, options, arguments): (Vec<_>, Vec<_>, &[_]) = if path.is_empty() {
        (
            tree.visible_commands().collect(),
            tree.global_options().values().collect(),
            &[],
        )
    } else {
        let command = tree
            .lookup(path)
            .ok_or_else(|| format!("unknown command '{}'", path.join(" ")))?;
        if let Some(help) = command.help() {
            let _ = writeln!(out, "\n{help}");
        }
        (
            command.visible_subcommands().collect(),
            command.options().values().collect(),
            command.arguments(),
        )
    };

    if !commands.is_empty() {
        let _ = writeln!(out, "\nCommands:");
        for command in commands {
            let _ = writeln!(out, "  {:<12} {}", command.name(), command.help().unwrap_or(""));
        }
    }
    if !arguments.is_empty() {
        let _ = writeln!(out, "\nArguments:");
        for argument in arguments.iter().filter(|arg| !arg.flags.hidden) {
            let _ = writeln!(
                out,
                "  {:<12} {}",
                argument.argument_name(),
                argument.help.as_deref().unwrap_or("")
            );
        }
    }
    let options: Vec<_> = options.into_iter().filter(|opt| !opt.flags.hidden).collect();
    if !options.is_empty() {
        let _ = writeln!(out, "\nOptions:");
        for option in options {
            let switch = match option.flags.alias {
                Some(alias) => format!("-{alias}, {}", option.canonical_name()),
                None => format!("    {}", option.canonical_name()),
            };
            let _ = writeln!(out, "  {switch:<20} {}", option.help.as_deref().unwrap_or(""));
        }
    }
    Ok(out)
}
