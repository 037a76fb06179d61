use clap::{Arg, Command as ClapCommand, ArgAction};
use std::error::Error;
use std::process;
use log::{debug, error};

use docimgx::utils::logger::Logger;
use docimgx::commands::{config_from_args, CommandFactory, DocimgxCommandFactory};

fn main() {
    let matches = ClapCommand::new("docimgx")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Extract embedded images from PDF, DOCX and PPTX documents")
        .arg(
            Arg::new("input")
                .help("Input documents")
                .value_name("INPUT")
                .num_args(1..)
                .required_unless_present("list-formats")
                .index(1),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Directory for extracted images (default: extracted_images beside each document)")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of documents processed in parallel")
                .value_name("N")
                .required(false),
        )
        .arg(
            Arg::new("dedupe")
                .long("dedupe")
                .help("Write identical images only once per document")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-jp2")
                .long("keep-jp2")
                .help("Keep JPEG 2000 images instead of converting them to PNG")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Do not show a progress bar")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log records and written paths to this file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List supported document formats and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");

    let config = match config_from_args(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let logger = match &config.log_file {
        Some(path) => match Logger::new(path) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error initializing logger: {}", e);
                process::exit(1);
            }
        },
        None => Logger::disabled(),
    };
    logger.init_global_logger(verbose);

    let factory = DocimgxCommandFactory::new(config);

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                if verbose {
                    let mut source = e.source();
                    while let Some(cause) = source {
                        debug!("Caused by: {}", cause);
                        source = cause.source();
                    }
                }
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
