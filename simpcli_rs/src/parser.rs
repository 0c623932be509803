//! clap adapter.
//!
//! Builds the parser tree from registered descriptors and collects matched
//! values back into the typed [`CommandArgs`] mapping. Descriptors are the
//! only input; nothing here inspects handlers or mutates the registry.

use anyhow::Context;
use clap::builder::{BoolishValueParser, ValueParser};
use clap::{Arg, ArgAction, ArgMatches, Command};
use heck::ToKebabCase;

use crate::command::{CommandDescriptor, ParameterDescriptor};
use crate::registry::Manager;
use crate::types::{ArgValue, CommandArgs, ParamType};

// ============================================================================
// Descriptor -> clap tree
// ============================================================================

/// Build the full parser tree for a registry.
///
/// The tree owns the reserved global `--verbose` flag and one subcommand per
/// registered descriptor. `no_binary_name` keeps the caller in charge of
/// argv[0]: [`Manager::run`](crate::Manager::run) strips it before parsing.
pub(crate) fn command_tree(manager: &Manager) -> Command {
    let mut tree = Command::new(manager.prog().to_string())
        .no_binary_name(true)
        .subcommand_required(false)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug output on the console"),
        );
    for descriptor in manager.commands() {
        tree = tree.subcommand(subcommand_for(descriptor));
    }
    tree
}

fn subcommand_for(descriptor: &CommandDescriptor) -> Command {
    // Tokens like `-3` are values for the numeric types, not short flags.
    let mut command = Command::new(descriptor.name.clone()).allow_negative_numbers(true);
    if let Some(summary) = &descriptor.summary {
        command = command.about(summary.clone());
    }
    for parameter in &descriptor.parameters {
        command = command.arg(arg_for(parameter));
    }
    command
}

/// One clap `Arg` per parameter descriptor.
///
/// The arg id is the declared parameter name, so matched values can be
/// collected under the name handlers look up. Positionals bind in
/// declaration order; flags surface kebab-cased. Defaults are rendered back
/// to tokens and fed through the value parser, taking the same coercion path
/// as user input.
fn arg_for(parameter: &ParameterDescriptor) -> Arg {
    let mut arg = Arg::new(parameter.name.clone())
        .value_parser(value_parser_for(parameter.kind))
        .required(parameter.default.is_none());
    if !parameter.positional {
        arg = arg.long(parameter.name.to_kebab_case());
    }
    if let Some(default) = &parameter.default {
        arg = arg.default_value(default.to_cli_token());
    }
    if let Some(help) = &parameter.help {
        arg = arg.help(help.clone());
    }
    arg
}

fn value_parser_for(kind: ParamType) -> ValueParser {
    match kind {
        ParamType::Str => ValueParser::string(),
        ParamType::Int => clap::value_parser!(i64).into(),
        ParamType::Float => clap::value_parser!(f64).into(),
        // Closed token set: yes/no, true/false, on/off, 1/0 and friends.
        ParamType::Bool => BoolishValueParser::new().into(),
    }
}

// ============================================================================
// Matches -> CommandArgs
// ============================================================================

/// Collect the matched values for one command into typed arguments.
///
/// Every declared parameter is present after a successful parse: required
/// ones were supplied, optional ones were filled from their defaults. A
/// missing entry means the tree and the descriptor disagree, which the
/// dispatcher reports as a fault.
pub(crate) fn collect_args(
    descriptor: &CommandDescriptor,
    matches: &ArgMatches,
) -> anyhow::Result<CommandArgs> {
    let mut args = CommandArgs::default();
    for parameter in &descriptor.parameters {
        let value = match parameter.kind {
            ParamType::Str => matches
                .get_one::<String>(&parameter.name)
                .map(|v| ArgValue::Str(v.clone())),
            ParamType::Int => matches
                .get_one::<i64>(&parameter.name)
                .map(|v| ArgValue::Int(*v)),
            ParamType::Float => matches
                .get_one::<f64>(&parameter.name)
                .map(|v| ArgValue::Float(*v)),
            ParamType::Bool => matches
                .get_one::<bool>(&parameter.name)
                .map(|v| ArgValue::Bool(*v)),
        }
        .with_context(|| {
            format!(
                "no value for parameter '{}' of command '{}'",
                parameter.name, descriptor.name
            )
        })?;
        args.insert(parameter.name.clone(), value);
    }
    Ok(args)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandSpec, ParamSpec};
    use crate::types::Outcome;
    use clap::error::ErrorKind;

    fn sample_manager() -> Manager {
        let mut manager = Manager::with_prog("test");
        manager
            .register(
                CommandSpec::new("convert", |_| Ok(Outcome::Code(0)))
                    .param(ParamSpec::string("name"))
                    .param(ParamSpec::integer("count"))
                    .param(ParamSpec::float("ratio").default_value(1.0))
                    .param(ParamSpec::boolean("dry_run").default_value(false)),
            )
            .unwrap();
        manager
            .register(CommandSpec::new("status", |_| Ok(Outcome::Code(0))))
            .unwrap();
        manager
    }

    #[test]
    fn test_tree_has_one_subcommand_per_registered_command() {
        let manager = sample_manager();
        let tree = command_tree(&manager);

        assert!(tree.find_subcommand("convert").is_some());
        assert!(tree.find_subcommand("status").is_some());
        assert!(tree.find_subcommand("missing").is_none());
    }

    #[test]
    fn test_values_coerce_to_declared_types() {
        let manager = sample_manager();
        let matches = command_tree(&manager)
            .try_get_matches_from(["convert", "hello", "5", "--ratio", "2.5", "--dry-run", "yes"])
            .unwrap();

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "convert");

        let args = collect_args(manager.descriptor("convert").unwrap(), sub).unwrap();
        assert_eq!(args.get_str("name").unwrap(), "hello");
        assert_eq!(args.get_int("count").unwrap(), 5);
        assert_eq!(args.get_float("ratio").unwrap(), 2.5);
        assert!(args.get_bool("dry_run").unwrap());
    }

    #[test]
    fn test_omitted_optionals_fall_back_to_defaults() {
        let manager = sample_manager();
        let matches = command_tree(&manager)
            .try_get_matches_from(["convert", "hello", "5"])
            .unwrap();

        let (_, sub) = matches.subcommand().unwrap();
        let args = collect_args(manager.descriptor("convert").unwrap(), sub).unwrap();
        assert_eq!(args.get_float("ratio").unwrap(), 1.0);
        assert!(!args.get_bool("dry_run").unwrap());
    }

    #[test]
    fn test_negative_numbers_bind_as_values() {
        let manager = sample_manager();
        let matches = command_tree(&manager)
            .try_get_matches_from(["convert", "hello", "-42", "--ratio", "-2.5"])
            .unwrap();

        let (_, sub) = matches.subcommand().unwrap();
        let args = collect_args(manager.descriptor("convert").unwrap(), sub).unwrap();
        assert_eq!(args.get_int("count").unwrap(), -42);
        assert_eq!(args.get_float("ratio").unwrap(), -2.5);
    }

    #[test]
    fn test_malformed_integer_fails_validation() {
        let manager = sample_manager();
        let err = command_tree(&manager)
            .try_get_matches_from(["convert", "hello", "notanumber"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_missing_required_positional_is_rejected() {
        let manager = sample_manager();
        let err = command_tree(&manager)
            .try_get_matches_from(["convert", "hello"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_boolean_tokens_are_a_closed_set() {
        let manager = sample_manager();

        let on = command_tree(&manager)
            .try_get_matches_from(["convert", "x", "1", "--dry-run", "on"])
            .unwrap();
        let (_, sub) = on.subcommand().unwrap();
        let args = collect_args(manager.descriptor("convert").unwrap(), sub).unwrap();
        assert!(args.get_bool("dry_run").unwrap());

        let off = command_tree(&manager)
            .try_get_matches_from(["convert", "x", "1", "--dry-run", "0"])
            .unwrap();
        let (_, sub) = off.subcommand().unwrap();
        let args = collect_args(manager.descriptor("convert").unwrap(), sub).unwrap();
        assert!(!args.get_bool("dry_run").unwrap());

        let err = command_tree(&manager)
            .try_get_matches_from(["convert", "x", "1", "--dry-run", "maybe"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_verbose_flag_is_global() {
        let manager = sample_manager();
        let matches = command_tree(&manager)
            .try_get_matches_from(["convert", "hello", "5", "--verbose"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }

    #[test]
    fn test_unknown_command_is_a_parse_error() {
        let manager = sample_manager();
        let err = command_tree(&manager)
            .try_get_matches_from(["nonsense"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }
}
