//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod inspect_command;
pub mod prepare_command;

pub use command_traits::{Command, CommandFactory};
pub use inspect_command::InspectCommand;
pub use prepare_command::PrepareCommand;

use clap::ArgMatches;

use crate::config::PrepConfig;
use crate::errors::PrepResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
#[derive(Default)]
pub struct LabelkitCommandFactory;

impl LabelkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        LabelkitCommandFactory
    }
}

impl CommandFactory for LabelkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, config: PrepConfig) -> PrepResult<Box<dyn Command>> {
        if args.get_flag("inspect") {
            Ok(Box::new(InspectCommand::new(config)?))
        } else {
            // Default to the full preparation run
            Ok(Box::new(PrepareCommand::new(config)?))
        }
    }
}
