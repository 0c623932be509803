//! Common types shared across the crate.
//!
//! The two contracts everything else builds on live here: [`CommandArgs`],
//! the typed argument mapping a command handler receives, and [`Outcome`],
//! the uniform result every dispatch produces.

use std::collections::BTreeMap;

use crate::error::ArgsError;

// ============================================================================
// Reserved exit codes
// ============================================================================

/// Exit code reported when the argument parser rejects the input.
pub const PARSE_ERROR_CODE: i32 = 10;

/// Sentinel exit code reported when a fault was contained during dispatch.
///
/// Deliberately distinct from [`PARSE_ERROR_CODE`]: a parse error is the
/// user's problem, a fault is the program's. Unix maps the value to 255 at
/// the process boundary.
pub const FAULT_CODE: i32 = -1;

// ============================================================================
// Parameter value model
// ============================================================================

/// Primitive type tag for a command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Free-form text (the default when no type is declared).
    Str,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean parsed from a closed token set (yes/no, true/false, on/off, 1/0).
    Bool,
}

impl ParamType {
    /// Human-readable name used in error messages and help text.
    pub fn label(self) -> &'static str {
        match self {
            ParamType::Str => "string",
            ParamType::Int => "integer",
            ParamType::Float => "float",
            ParamType::Bool => "boolean",
        }
    }
}

/// A parsed, typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ArgValue {
    /// The type tag this value carries.
    pub fn kind(&self) -> ParamType {
        match self {
            ArgValue::Str(_) => ParamType::Str,
            ArgValue::Int(_) => ParamType::Int,
            ArgValue::Float(_) => ParamType::Float,
            ArgValue::Bool(_) => ParamType::Bool,
        }
    }

    /// Render the value as a single raw argument token.
    ///
    /// Used to feed declared defaults through the parser backend, so defaults
    /// take the same coercion path as user input.
    pub(crate) fn to_cli_token(&self) -> String {
        match self {
            ArgValue::Str(s) => s.clone(),
            ArgValue::Int(i) => i.to_string(),
            ArgValue::Float(f) => f.to_string(),
            ArgValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

// ============================================================================
// Bound arguments handed to handlers
// ============================================================================

/// The structured argument mapping a command handler receives.
///
/// Every parameter the command declared is present: required values come from
/// the parse, optional ones are filled from their declared defaults. Lookup
/// is by the parameter's declared name.
#[derive(Debug, Default, Clone)]
pub struct CommandArgs {
    values: BTreeMap<String, ArgValue>,
}

impl CommandArgs {
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw access to a bound value.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Fetch a string parameter.
    pub fn get_str(&self, name: &str) -> Result<&str, ArgsError> {
        match self.lookup(name)? {
            ArgValue::Str(s) => Ok(s),
            other => Err(self.wrong_type(name, ParamType::Str, other)),
        }
    }

    /// Fetch an integer parameter.
    pub fn get_int(&self, name: &str) -> Result<i64, ArgsError> {
        match self.lookup(name)? {
            ArgValue::Int(i) => Ok(*i),
            other => Err(self.wrong_type(name, ParamType::Int, other)),
        }
    }

    /// Fetch a float parameter.
    pub fn get_float(&self, name: &str) -> Result<f64, ArgsError> {
        match self.lookup(name)? {
            ArgValue::Float(f) => Ok(*f),
            other => Err(self.wrong_type(name, ParamType::Float, other)),
        }
    }

    /// Fetch a boolean parameter.
    pub fn get_bool(&self, name: &str) -> Result<bool, ArgsError> {
        match self.lookup(name)? {
            ArgValue::Bool(b) => Ok(*b),
            other => Err(self.wrong_type(name, ParamType::Bool, other)),
        }
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&ArgValue, ArgsError> {
        self.values
            .get(name)
            .ok_or_else(|| ArgsError::Missing(name.to_string()))
    }

    fn wrong_type(&self, name: &str, requested: ParamType, actual: &ArgValue) -> ArgsError {
        ArgsError::WrongType {
            name: name.to_string(),
            requested: requested.label(),
            actual: actual.kind().label(),
        }
    }
}

// ============================================================================
// Dispatch outcome contract
// ============================================================================

/// The uniform outcome of a dispatch: an exit code, or an error message to
/// display with an implicit non-zero code.
///
/// Every path through [`Manager::run`](crate::Manager::run) produces exactly
/// one `Outcome`; no path leaves it unset and none panics past the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Exit with this code (0 means success by convention).
    Code(i32),
    /// Print this message as an error and exit non-zero.
    Message(String),
}

/// Return contract for command handlers.
///
/// `Ok` carries the command's own outcome. `Err` is a command-body fault and
/// is contained by the dispatcher, never propagated to the caller of `run`.
pub type HandlerResult = anyhow::Result<Outcome>;

// ============================================================================
// Tests
// ============================================================================
