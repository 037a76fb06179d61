//! Image extraction command
//!
//! This module implements the command for extracting embedded images
//! from one or more documents and printing the written paths.

use std::io::{self, Write};
use std::path::PathBuf;
use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::config::ExtractorConfig;
use crate::errors::{ExtractError, ExtractResult};
use crate::extractor::ImageExtractor;
use crate::handlers::HandlerRegistry;
use crate::utils::logger::Logger;

/// Command for extracting images from documents
pub struct ExtractCommand<'a> {
    /// Documents to process, in command-line order
    inputs: Vec<PathBuf>,
    /// Shared output directory, if given
    output_dir: Option<PathBuf>,
    /// Run settings
    config: ExtractorConfig,
    /// Handlers keyed by extension
    registry: &'a HandlerRegistry,
    /// Journal for written image paths
    logger: &'a Logger,
}

impl<'a> ExtractCommand<'a> {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `registry` - Registry used to resolve document handlers
    /// * `config` - Run settings
    /// * `logger` - Journal for written image paths
    ///
    /// # Returns
    /// A new ExtractCommand instance or an error
    pub fn new(args: &ArgMatches, registry: &'a HandlerRegistry, config: ExtractorConfig,
               logger: &'a Logger) -> ExtractResult<Self> {
        let inputs: Vec<PathBuf> = args
            .get_many::<String>("input")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default();

        if inputs.is_empty() {
            return Err(ExtractError::GenericError("Missing input file".to_string()));
        }

        let output_dir = args.get_one::<String>("output-dir").map(PathBuf::from);
        info!("Inputs: {}, output directory: {:?}", inputs.len(), output_dir);

        Ok(ExtractCommand {
            inputs,
            output_dir,
            config,
            registry,
            logger,
        })
    }
}

impl<'a> Command for ExtractCommand<'a> {
    fn execute(&self) -> ExtractResult<()> {
        let extractor = ImageExtractor::new(self.registry, self.logger, self.config.clone());
        let reports = extractor.extract_many(&self.inputs, self.output_dir.as_deref());

        let stdout = io::stdout();
        let mut out = stdout.lock();
        for report in &reports {
            for path in report.written() {
                writeln!(out, "{}", path.display())?;
            }
        }
        out.flush()?;

        let total = reports.len();
        let mut failures: Vec<ExtractError> = reports
            .into_iter()
            .filter_map(|report| report.result.err())
            .collect();

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            n => Err(ExtractError::GenericError(format!("{} of {} documents failed", n, total))),
        }
    }
}
