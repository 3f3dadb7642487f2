#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use meteor_imports_core::MeteorImportsConfig;
use miette::{miette, IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meteor-imports")]
#[command(author, version, about = "Bridge a pre-built Meteor client bundle into a host bundler", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Plugin configuration file (JSON, same shape the bundler plugin takes)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Meteor project folder (shorthand for a config with only meteorFolder)
    #[arg(long, global = true, value_name = "PATH")]
    meteor_folder: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// List the packages retained from the build manifest
    Packages,

    /// Print the virtual-module alias table
    Aliases,

    /// Classify a file path the way the bundler pipeline would
    Classify {
        /// Resolved module path to classify
        path: String,
    },

    /// Transform one compiled file and print (or write) the result
    Transform {
        /// Compiled package file to transform
        file: PathBuf,

        /// Output file (if not specified, prints to stdout)
        #[arg(long, short = 'o')]
        outfile: Option<PathBuf>,
    },

    /// Print the generated entry-aggregator module
    Entry,

    /// Print the generated runtime-config module
    RuntimeConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    if matches!(cli.command, Commands::Version) {
        println!("{}", meteor_imports_core::version::version_string());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref(), cli.meteor_folder)?;
    let ctx = commands::BuildContext::prepare(cwd, config)?;

    match cli.command {
        Commands::Version => unreachable!("handled above"),
        Commands::Packages => commands::packages::run(&ctx, cli.json),
        Commands::Aliases => commands::aliases::run(&ctx, cli.json),
        Commands::Classify { path } => commands::classify::run(&ctx, &path, cli.json),
        Commands::Transform { file, outfile } => {
            commands::transform::run(&ctx, &file, outfile.as_deref())
        }
        Commands::Entry => commands::entry::run(&ctx),
        Commands::RuntimeConfig => commands::runtime_config::run(&ctx),
    }
}

fn load_config(
    path: Option<&std::path::Path>,
    meteor_folder: Option<String>,
) -> Result<MeteorImportsConfig> {
    let mut config = match path {
        Some(path) => {
            meteor_imports_util::fs::read_json::<MeteorImportsConfig>(path)
                .map_err(|e| miette!("failed to load config {}: {e}", path.display()))?
        }
        None => MeteorImportsConfig::default(),
    };

    if meteor_folder.is_some() {
        config.meteor_folder = meteor_folder;
        config.meteor_programs_folder = None;
    }
    if config.meteor_folder.is_none() && config.meteor_programs_folder.is_none() {
        return Err(miette!(
            "no Meteor build location given; pass --meteor-folder or a --config file"
        ));
    }

    // Fail early on contradictory options so every subcommand sees a
    // resolvable config.
    config.resolve().into_diagnostic()?;
    Ok(config)
}
