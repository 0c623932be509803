//! # simpcli
//!
//! **Declarative command line interfaces** - register typed commands once and
//! get argument parsing, dispatch, and logging for free.
//!
//! ## Features
//!
//! - **Explicit schema** - Commands declare their parameters as data: name,
//!   type, default, surface. No reflection, no macros.
//! - **Derived CLI** - Kebab-cased command names, positional/flag binding
//!   rules, generated help, and typed coercion come from the schema.
//! - **Uniform outcomes** - Every invocation yields an [`Outcome`]; parse
//!   failures, handler errors and panics are mapped, never thrown.
//! - **Layered logging** - Console sink with a `--verbose` switch, plus an
//!   optional rotated file sink attachable at runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simpcli::{CommandSpec, Manager, Outcome, ParamSpec};
//!
//! fn main() {
//!     let mut manager = Manager::new();
//!     manager
//!         .register(
//!             CommandSpec::new("greet", |args| {
//!                 let name = args.get_str("name")?;
//!                 if name.is_empty() {
//!                     // `Message` is the diagnostic channel: stderr, exit 1.
//!                     return Ok(Outcome::Message("give me a name".into()));
//!                 }
//!                 println!("hello {name}");
//!                 Ok(Outcome::Code(0))
//!             })
//!             .summary("Greet someone by name")
//!             .param(ParamSpec::string("name")),
//!         )
//!         .expect("valid command");
//!     manager.handle_main();
//! }
//! ```
//!
//! ## CLI Surface
//!
//! ```bash
//! prog greet world             # positional binding
//! prog greet world --verbose   # same, with debug console output
//! prog help greet              # generated help for one command
//! ```
//!
//! Unknown commands and malformed arguments exit with code 10; handler
//! errors and panics are logged once and exit with the fault code.

#![doc(html_root_url = "https://docs.rs/simpcli/0.1.0")]

// ============================================================================
// Core Modules
// ============================================================================

/// Command declaration and descriptor derivation.
///
/// # Key Types
///
/// - [`CommandSpec`](command::CommandSpec) - A command under construction
/// - [`ParamSpec`](command::ParamSpec) - One typed parameter
/// - [`ParamOverride`](command::ParamOverride) - Surface annotation
/// - [`CommandDescriptor`](command::CommandDescriptor) - Derived, immutable form
pub mod command;

/// Error taxonomy: schema, registration, argument access, and logging errors.
pub mod error;

/// Logging facility: console sink, optional rotated file sink, scoped
/// loggers.
///
/// # Example
///
/// ```rust,no_run
/// use simpcli::logging::{self, LogTarget};
///
/// logging::attach_file_sink(LogTarget::file("logs/app.log")).unwrap();
/// let log = logging::scoped("worker");
/// log.info("ready");
/// ```
pub mod logging;

/// The command registry.
///
/// Contains [`Manager`](registry::Manager), the crate's entry point.
pub mod registry;

/// Common types: parameter kinds, bound arguments, outcomes, reserved codes.
pub mod types;

// Internal: clap adapter and the dispatch loop on `Manager`.
mod dispatch;
mod parser;

// ============================================================================
// Re-exports for convenience
// ============================================================================

/// Command registry and dispatcher.
pub use registry::Manager;

/// A command declaration under construction.
pub use command::CommandSpec;

/// One declared, typed command parameter.
pub use command::ParamSpec;

/// Annotation adjusting a parameter's command-line surface.
pub use command::ParamOverride;

/// A registered command in derived form.
pub use command::CommandDescriptor;

/// Derived metadata for one parameter.
pub use command::ParameterDescriptor;

/// Dispatch outcome: exit code or message.
pub use types::Outcome;

/// Typed arguments handed to handlers.
pub use types::CommandArgs;

/// A parsed argument value.
pub use types::ArgValue;

/// Parameter type tag.
pub use types::ParamType;

/// Result type command handlers return.
pub use types::HandlerResult;

/// Exit code for unknown commands and malformed arguments.
pub use types::PARSE_ERROR_CODE;

/// Exit code for handler errors and contained panics.
pub use types::FAULT_CODE;

/// File sink destination.
pub use logging::LogTarget;

/// Named logger for one subsystem.
pub use logging::ScopedLogger;

/// Schema validation failure.
pub use error::SignatureError;

/// Registration failure.
pub use error::RegistryError;

/// Typed argument access failure.
pub use error::ArgsError;

/// File sink attachment failure.
pub use error::LoggingError;
