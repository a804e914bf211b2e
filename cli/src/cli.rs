//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;

/// Agent template resolution and verification for cloud build agents
#[derive(Parser)]
#[command(
    name = "vmagent",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve, migrate and inspect agent templates
    #[command(subcommand)]
    Template(commands::template::TemplateCommand),

    /// Print the generated storage account name for a resource group
    StorageName(commands::storage_name::StorageNameArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
        } = self;
        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            json,
        });

        match command {
            Command::Template(cmd) => commands::template::run(&app, cmd).await,
            Command::StorageName(args) => commands::storage_name::run(&app, args),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => Ok(commands::version::run(&app)),
        }
    }
}
