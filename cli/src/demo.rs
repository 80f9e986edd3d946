//! Built-in demo tree and handlers used by `cmdtree run`.

use std::collections::BTreeMap;

use command_tree_core::{BuildError, CommandDescriptor, CommandTree, TransformRegistry, TreeManifest};
use command_tree_dispatch::{HandlerRegistry, ResolvedOptions};

/// Handlers either produce stdout text or a user-facing error.
pub type HandlerOutput = Result<String, String>;

const DEMO_MANIFEST: &str = r#"
global_options:
  verbose: { type: boolean, alias: v, help: Print extra detail }
commands:
  hello:
    help: Greet someone
    arguments:
      - { name: name, type: string, required: true, help: Who to greet }
    options:
      greeting: { type: string, default: Hello, transform: trim, help: Greeting word }
      shout: { type: boolean, help: Upper-case the whole greeting }
  keys:
    help: Inspect and update the demo key store
    options:
      store: { type: string, alias: s, default: memory, help: Store to operate on }
    subcommands:
      set:
        target: keys_set
        help: Write a key
        options:
          key: { type: string, required: true, transform: downcase, help: Key name }
          value: { type: string, required: true, help: Value to write }
      get:
        target: keys_get
        help: Read a key
        arguments:
          - { name: key, type: string, required: true, transform: downcase }
  ping:
    help: Check that dispatch works
    options:
      count: { type: integer, alias: c, default: 1, help: Number of replies }
  exec:
    help: Echo a command line instead of running it
    options:
      env: { type: repeated, alias: e, help: KEY=VALUE pairs to show }
"#;

pub fn tree() -> Result<CommandTree, BuildError> {
    TreeManifest::from_yaml_str(DEMO_MANIFEST)?.build(&TransformRegistry::with_builtins())
}

const MAX_PING_COUNT: i64 = 100;

fn seeded_store() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([("color", "blue"), ("editor", "vi"), ("shell", "sh")])
}

pub fn handlers() -> HandlerRegistry<HandlerOutput> {
    let mut handlers = HandlerRegistry::new();
    handlers
        .register("hello", |_argv, options| {
            let greeting = options.get_str("greeting").unwrap_or("Hello");
            let name = options.get_str("name").unwrap_or_default();
            let line = format!("{greeting}, {name}!");
            if options.get_bool("shout") == Some(true) {
                Ok(line.to_uppercase())
            } else {
                Ok(line)
            }
        })
        .register("keys_set", |_argv, options| {
            let store = options.get_str("store").unwrap_or("memory");
            let key = options.get_str("key").unwrap_or_default();
            let value = options.get_str("value").unwrap_or_default();
            Ok(format!("{store}: {key} = {value}"))
        })
        .register("keys_get", |_argv, options| {
            let store = options.get_str("store").unwrap_or("memory");
            let key = options.get_str("key").unwrap_or_default();
            seeded_store()
                .get(key)
                .map(|value| format!("{store}: {key} = {value}"))
                .ok_or_else(|| format!("key '{key}' not found in {store}"))
        })
        .register("ping", |_argv, options| {
            let count = options.get_i64("count").unwrap_or(1).max(0);
            if count > MAX_PING_COUNT {
                return Err(format!("--count must be at most {MAX_PING_COUNT}, got {count}"));
            }
            let mut lines: Vec<String> = (1..=count).map(|n| format!("pong {n}")).collect();
            if options.get_bool("verbose") == Some(true) {
                lines.push(format!("sent {count} repl{}", if count == 1 { "y" } else { "ies" }));
            }
            Ok(lines.join("\n"))
        })
        .register("exec", |argv, options| {
            if argv.is_empty() {
                return Err("nothing to execute".to_string());
            }
            let mut line = String::from("exec:");
            for pair in options.get_list("env").unwrap_or_default() {
                line.push(' ');
                line.push_str(&pair.to_string());
            }
            for arg in argv {
                line.push(' ');
                line.push_str(arg);
            }
            Ok(line)
        });
    handlers
}

/// Rejects keys that would not round-trip through `KEY=VALUE` output.
pub fn check_keys(
    command: &CommandDescriptor,
    _argv: &[String],
    options: ResolvedOptions,
) -> Result<ResolvedOptions, String> {
    if command.target() == "keys_set" {
        if let Some(key) = options.get_str("key") {
            if key.contains('=') {
                return Err(format!("key '{key}' must not contain '='"));
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_tree_builds_with_handlers_for_every_target() {
        let tree = tree().unwrap();
        assert!(handlers().missing_targets(&tree).is_empty());
        assert!(tree.lookup(&["keys", "get"]).is_some());
    }
}
