//! Error taxonomy.
//!
//! Registration-time errors ([`SignatureError`], [`RegistryError`]) are
//! programmer errors: they surface during startup and are meant to fail fast,
//! before the CLI ever serves a request. Nothing in this module is produced
//! during dispatch; dispatch-time failures are normalized into an
//! [`Outcome`](crate::Outcome) instead.

use std::path::PathBuf;

use thiserror::Error;

/// A command's declared schema and its annotations do not line up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// An annotation names a parameter the schema does not declare.
    #[error("annotation targets unknown parameter '{0}'")]
    UnknownParameter(String),

    /// More anonymous annotations than parameters left to claim.
    #[error("annotation #{0} has no parameter left to apply to")]
    ExcessAnnotation(usize),

    /// Two annotations ended up on the same parameter.
    #[error("parameter '{0}' is annotated twice")]
    DuplicateAnnotation(String),

    /// The schema declares the same parameter name twice.
    #[error("parameter '{0}' is declared twice")]
    DuplicateParameter(String),

    /// The name collides with a flag the framework owns.
    #[error("parameter name '{0}' is reserved")]
    ReservedName(String),

    /// A required positional may not follow an optional one.
    #[error("required positional parameter '{0}' follows an optional one")]
    RequiredAfterOptional(String),

    /// A declared default does not match the parameter's declared type.
    #[error("default for parameter '{name}' is {actual}, not {declared}")]
    DefaultTypeMismatch {
        name: String,
        declared: &'static str,
        actual: &'static str,
    },
}

/// Registration failed; the registry is left unchanged.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The derived command name is already taken. Re-registration is a hard
    /// failure, never a silent overwrite.
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    /// The name collides with the parser backend's built-in help command.
    #[error("command name '{0}' is reserved")]
    ReservedCommand(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// A handler asked [`CommandArgs`](crate::CommandArgs) for something it does
/// not hold. Propagating this from a handler follows the ordinary
/// command-body fault path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("no argument named '{0}'")]
    Missing(String),

    #[error("argument '{name}' is {actual}, not {requested}")]
    WrongType {
        name: String,
        requested: &'static str,
        actual: &'static str,
    },
}

/// Configuring the log file sink failed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The target path has no usable file name component.
    #[error("log file target '{}' has no file name", .0.display())]
    InvalidTarget(PathBuf),

    /// Creating the parent directory for the log file failed.
    #[error("cannot create log directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rotating appender could not be built.
    #[error(transparent)]
    Appender(#[from] tracing_appender::rolling::InitError),
}
