//! The command registry.
//!
//! [`Manager`] owns every registered command, keyed by derived name. It is
//! the single entry point of the crate: declare commands, register them,
//! then hand the process arguments to [`Manager::run`](crate::Manager::run).

use std::collections::BTreeMap;

use heck::ToKebabCase;

use crate::command::{CommandDescriptor, CommandSpec};
use crate::error::RegistryError;

/// Command name owned by the parser backend.
const RESERVED_COMMAND: &str = "help";

/// Registry and dispatcher for a command line program.
///
/// Commands are stored under their derived kebab-case names; iteration and
/// generated help follow that name order.
///
/// ```
/// use simpcli::{CommandSpec, Manager, Outcome, ParamSpec};
///
/// let mut manager = Manager::with_prog("demo");
/// manager
///     .register(
///         CommandSpec::new("greet", |args| {
///             println!("hello {}", args.get_str("name")?);
///             Ok(Outcome::Code(0))
///         })
///         .param(ParamSpec::string("name")),
///     )
///     .unwrap();
///
/// assert_eq!(manager.run(["greet", "world"]), Outcome::Code(0));
/// ```
#[derive(Debug)]
pub struct Manager {
    prog: String,
    commands: BTreeMap<String, CommandDescriptor>,
}

impl Manager {
    /// An empty registry. The program name is taken from the current
    /// executable, falling back to `cli` when it cannot be determined.
    pub fn new() -> Self {
        let prog = std::env::current_exe()
            .ok()
            .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "cli".to_string());
        Self::with_prog(prog)
    }

    /// An empty registry with an explicit program name for help output.
    pub fn with_prog(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            commands: BTreeMap::new(),
        }
    }

    /// Register a command.
    ///
    /// The command name is the spec's name normalized to kebab-case. Fails
    /// without touching the registry when the name is taken or reserved, or
    /// when the spec's parameter schema is invalid.
    pub fn register(&mut self, spec: CommandSpec) -> Result<(), RegistryError> {
        let name = spec.name().to_kebab_case();
        if name == RESERVED_COMMAND {
            return Err(RegistryError::ReservedCommand(name));
        }
        if self.commands.contains_key(&name) {
            return Err(RegistryError::DuplicateCommand(name));
        }
        let descriptor = spec.into_descriptor(name.clone())?;
        self.commands.insert(name, descriptor);
        Ok(())
    }

    /// Program name used in generated help.
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// Look up a registered command by its derived name.
    pub fn descriptor(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Whether a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered descriptors in name order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ParamSpec;
    use crate::types::Outcome;

    fn spec(name: &str) -> CommandSpec {
        CommandSpec::new(name, |_| Ok(Outcome::Code(0)))
    }

    #[test]
    fn test_register_derives_kebab_case_name() {
        let mut manager = Manager::with_prog("test");
        manager.register(spec("positional_args")).unwrap();

        assert!(manager.contains("positional-args"));
        assert!(!manager.contains("positional_args"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut manager = Manager::with_prog("test");
        manager.register(spec("build")).unwrap();

        let err = manager.register(spec("build")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand(name) if name == "build"));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_reserved_command_name_rejected() {
        let mut manager = Manager::with_prog("test");

        let err = manager.register(spec("Help")).unwrap_err();
        assert!(matches!(err, RegistryError::ReservedCommand(name) if name == "help"));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_invalid_schema_leaves_registry_unchanged() {
        let mut manager = Manager::with_prog("test");
        let bad = spec("deploy")
            .param(ParamSpec::string("target"))
            .param(ParamSpec::integer("target"));

        let err = manager.register(bad).unwrap_err();
        assert!(matches!(err, RegistryError::Signature(_)));
        assert!(manager.is_empty());

        // The name stays free after a failed attempt.
        manager.register(spec("deploy")).unwrap();
        assert!(manager.contains("deploy"));
    }

    #[test]
    fn test_descriptor_lookup_carries_summary() {
        let mut manager = Manager::with_prog("test");
        manager
            .register(spec("status").summary("show current state"))
            .unwrap();

        let descriptor = manager.descriptor("status").unwrap();
        assert_eq!(descriptor.name, "status");
        assert_eq!(descriptor.summary.as_deref(), Some("show current state"));
    }

    #[test]
    fn test_commands_iterate_in_name_order() {
        let mut manager = Manager::with_prog("test");
        manager.register(spec("zeta")).unwrap();
        manager.register(spec("alpha")).unwrap();

        let names: Vec<&str> = manager.commands().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }
}
