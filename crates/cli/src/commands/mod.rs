//! Command implementations.
//!
//! Each command renders either a human-readable table or, with `--json`,
//! the serialized domain value.

pub mod cart;
pub mod catalog;
pub mod checkout;

use serde::Serialize;

/// Result of running one command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Output mode selected on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON or through `render`.
    #[allow(clippy::print_stdout)]
    pub fn emit<T: Serialize>(self, value: &T, render: impl FnOnce(&T) -> String) -> CommandResult {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", render(value));
        }
        Ok(())
    }
}
