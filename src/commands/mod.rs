//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod extract_command;
pub mod formats_command;

pub use command_traits::{Command, CommandFactory};
pub use extract_command::ExtractCommand;
pub use formats_command::FormatsCommand;

use std::path::PathBuf;
use clap::ArgMatches;
use log::debug;
use crate::config::ExtractorConfig;
use crate::errors::{ExtractError, ExtractResult};
use crate::handlers::HandlerRegistry;
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct DocimgxCommandFactory {
    /// Handlers available to every command
    registry: HandlerRegistry,
    /// Settings resolved from the config file and flags
    config: ExtractorConfig,
}

impl DocimgxCommandFactory {
    /// Create a new factory instance with every supported document format
    ///
    /// # Arguments
    /// * `config` - Settings built by [`config_from_args`]
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_registry(HandlerRegistry::with_default_handlers(), config)
    }

    /// Create a factory using a custom handler registry
    pub fn with_registry(registry: HandlerRegistry, config: ExtractorConfig) -> Self {
        DocimgxCommandFactory { registry, config }
    }
}

impl<'a> CommandFactory<'a> for DocimgxCommandFactory {
    fn create_command(&'a self, args: &ArgMatches, logger: &'a Logger) -> ExtractResult<Box<dyn Command + 'a>> {
        if args.get_flag("list-formats") {
            Ok(Box::new(FormatsCommand::new(&self.registry)))
        } else {
            Ok(Box::new(ExtractCommand::new(args, &self.registry, self.config.clone(), logger)?))
        }
    }
}

/// Build the run configuration from the CLI arguments
///
/// Values from `--config` override the defaults; flags override both.
pub fn config_from_args(args: &ArgMatches) -> ExtractResult<ExtractorConfig> {
    let mut config = match args.get_one::<String>("config") {
        Some(path) => ExtractorConfig::from_file(&PathBuf::from(path))?,
        None => ExtractorConfig::default(),
    };

    if let Some(jobs) = args.get_one::<String>("jobs") {
        config.jobs = match jobs.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return Err(ExtractError::ConfigError(format!("Invalid number of jobs: {}", jobs))),
        };
    }
    if args.get_flag("dedupe") {
        config.dedupe = true;
    }
    if args.get_flag("keep-jp2") {
        config.convert_jp2 = false;
    }
    if args.get_flag("no-progress") {
        config.progress = false;
    }
    if let Some(log_file) = args.get_one::<String>("log-file") {
        config.log_file = Some(PathBuf::from(log_file));
    }

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}
