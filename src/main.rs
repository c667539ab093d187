use std::process;
use log::error;

use labelkit::cli::build_cli;
use labelkit::commands::{CommandFactory, LabelkitCommandFactory};
use labelkit::config::PrepConfig;
use labelkit::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();

    let config = match PrepConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let level = match config.level_filter() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = Logger::init_global_logger(config.log_file.as_deref(), level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = LabelkitCommandFactory::new();

    let command_result = factory.create_command(&matches, config);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
