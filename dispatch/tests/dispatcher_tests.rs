use command_tree_core::{CommandDescriptor, CommandSpec, CommandTree, OptionDescriptor, TreeBuilder, Value};
use command_tree_dispatch::{
    DispatchError, Dispatcher, HandlerRegistry, Outcome, ParseFailureKind, PreDispatch,
    ResolvedOptions,
};

fn tree() -> CommandTree {
    let mut builder = TreeBuilder::new();
    builder
        .register_option(&[], OptionDescriptor::string("user"))
        .unwrap();
    builder
        .add_command(
            CommandSpec::new("hello").with_argument(OptionDescriptor::string("name").required()),
        )
        .add_command(CommandSpec::new("exec"))
        .add_command(CommandSpec::new("admin").with_target("admin_panel"));
    builder.build().unwrap()
}

fn handlers() -> HandlerRegistry<String> {
    let mut handlers = HandlerRegistry::new();
    handlers
        .register("hello", |_argv, options| {
            format!("Hello, {}!", options.get_str("name").unwrap_or("?"))
        })
        .register("exec", |argv, _options| argv.join(" "));
    handlers
}

#[test]
fn test_run_invokes_handler_with_residual_and_options() {
    let dispatcher = Dispatcher::new(tree(), handlers());

    assert_eq!(
        dispatcher.run(&["hello", "Ada"]).unwrap(),
        Outcome::Handled("Hello, Ada!".to_string())
    );
    assert_eq!(
        dispatcher.run(&["exec", "ls", "-la"]).unwrap(),
        Outcome::Handled("ls -la".to_string())
    );
}

#[test]
fn test_run_returns_help_without_calling_handlers() {
    let dispatcher = Dispatcher::new(tree(), handlers());

    match dispatcher.run(&["help", "hello"]).unwrap() {
        Outcome::Help(request) => assert_eq!(request.path, vec!["hello"]),
        other => panic!("expected help, got {other:?}"),
    }
}

#[test]
fn test_missing_handler_is_typed_error() {
    let dispatcher = Dispatcher::new(tree(), handlers());

    let err = dispatcher.run(&["admin"]).unwrap_err();
    assert_eq!(
        err,
        DispatchError::HandlerNotFound {
            target: "admin_panel".to_string(),
            command: "admin".to_string(),
        }
    );
    assert_eq!(dispatcher.handlers().missing_targets(dispatcher.tree()), vec!["admin_panel"]);
}

#[test]
fn test_parse_failures_pass_through() {
    let dispatcher = Dispatcher::new(tree(), handlers());

    match dispatcher.run(&["hello"]).unwrap_err() {
        DispatchError::Parse(failure) => {
            assert_eq!(failure.kind, ParseFailureKind::MissingRequiredOption)
        }
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[test]
fn test_pre_dispatch_can_rewrite_options() {
    let dispatcher = Dispatcher::new(tree(), handlers()).with_pre_dispatch(
        |command: &CommandDescriptor, _argv: &[String], mut options: ResolvedOptions| {
            if command.name() == "hello" {
                let name = options.get_str("name").unwrap_or_default().to_uppercase();
                options.insert("name", Value::from(name));
            }
            Ok(options)
        },
    );

    assert_eq!(
        dispatcher.run(&["hello", "ada"]).unwrap(),
        Outcome::Handled("Hello, ADA!".to_string())
    );
}

struct RequireUser;

impl PreDispatch for RequireUser {
    fn pre_dispatch(
        &self,
        _command: &CommandDescriptor,
        _argv: &[String],
        options: ResolvedOptions,
    ) -> Result<ResolvedOptions, String> {
        if options.contains("user") {
            Ok(options)
        } else {
            Err("login required".to_string())
        }
    }
}

#[test]
fn test_pre_dispatch_rejection_becomes_parse_failure() {
    let dispatcher = Dispatcher::new(tree(), handlers()).with_hook(RequireUser);

    match dispatcher.run(&["exec", "true"]).unwrap_err() {
        DispatchError::Parse(failure) => {
            assert_eq!(failure.kind, ParseFailureKind::PreDispatch);
            assert_eq!(failure.message, "login required");
            assert_eq!(failure.command_path, vec!["exec"]);
        }
        other => panic!("expected pre-dispatch failure, got {other:?}"),
    }

    assert_eq!(
        dispatcher.run(&["--user", "root", "exec", "true"]).unwrap(),
        Outcome::Handled("true".to_string())
    );
}
