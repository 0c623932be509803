//! Dispatch loop and the uniform outcome contract.
//!
//! [`Manager::run`] is total: whatever a handler does, the caller gets an
//! [`Outcome`] back. Parse failures are printed by the backend and mapped to
//! the reserved parse error code; handler errors and panics are logged once
//! at error level and mapped to the fault code. [`Manager::handle_main`]
//! turns the outcome into a process exit.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::process;

use clap::error::ErrorKind;
use tracing::error;

use crate::logging;
use crate::parser;
use crate::registry::Manager;
use crate::types::{FAULT_CODE, Outcome, PARSE_ERROR_CODE};

impl Manager {
    /// Parse `args` and invoke the matching command.
    ///
    /// `args` is the argument vector without the program name;
    /// [`Manager::handle_main`] feeds it the process arguments. Initializes
    /// the logging facility on first use. Never panics and never exits: the
    /// whole invocation runs inside the panic guard, token conversion
    /// included.
    pub fn run<I, S>(&self, args: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        logging::init();
        let invocation = panic::catch_unwind(AssertUnwindSafe(|| {
            let argv: Vec<String> = args.into_iter().map(Into::into).collect();
            self.dispatch(&argv)
        }));
        match invocation {
            Ok(outcome) => outcome,
            Err(payload) => {
                error!("Unhandled Exception: {}", panic_message(payload.as_ref()));
                Outcome::Code(FAULT_CODE)
            }
        }
    }

    /// Run against the process arguments and exit with the mapped code.
    ///
    /// `Code(c)` exits with `c`. `Message(m)` prints the message to stderr
    /// and exits with 1. Arguments are read as OS strings and converted
    /// lossily, so argv bytes that are not valid unicode cannot panic here.
    pub fn handle_main(&self) -> ! {
        let args = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned());
        match self.run(args) {
            Outcome::Code(code) => process::exit(code),
            Outcome::Message(message) => {
                eprintln!("{message}");
                process::exit(1);
            }
        }
    }

    fn dispatch(&self, argv: &[String]) -> Outcome {
        let matches = match parser::command_tree(self).try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) => return parse_failure(err),
        };

        // The reserved flag acts before command resolution and stays in
        // effect for the rest of the process.
        if matches.get_flag("verbose") {
            logging::console_verbose(true);
        }

        let (name, sub) = match matches.subcommand() {
            Some(pair) => pair,
            None => {
                error!("No command provided.");
                return Outcome::Code(FAULT_CODE);
            }
        };
        let descriptor = match self.descriptor(name) {
            Some(descriptor) => descriptor,
            None => {
                error!("Unknown Command: {name}");
                return Outcome::Code(FAULT_CODE);
            }
        };

        let invocation =
            parser::collect_args(descriptor, sub).and_then(|args| descriptor.invoke(&args));
        match invocation {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("Unhandled Exception: {err:#}");
                Outcome::Code(FAULT_CODE)
            }
        }
    }
}

/// Map a backend parse failure to an outcome.
///
/// Help and version requests are not failures: the rendered text goes to
/// stdout and the outcome is success. Everything else prints the backend's
/// diagnostic to stderr and yields the reserved parse error code.
fn parse_failure(err: clap::Error) -> Outcome {
    let code = match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => PARSE_ERROR_CODE,
    };
    let _ = err.print();
    Outcome::Code(code)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
