//! Command-line argument definitions for the infragram CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. The `render` subcommand turns a TOML schema into a PNG
//! and/or a draw.io document; `validate` checks an existing draw.io document.

use clap::{Parser, Subcommand};

/// Command-line arguments for the infragram diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a schema to PNG and/or draw.io
    Render(RenderArgs),
    /// Check the structure of a draw.io document
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Path to the input schema (TOML)
    #[arg(help = "Path to the input schema")]
    pub schema: String,

    /// Write the PNG here; when neither output is given, the schema's own
    /// output selection is used with paths next to the schema
    #[arg(long)]
    pub png: Option<String>,

    /// Write the draw.io document here
    #[arg(long)]
    pub drawio: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Path to the draw.io document
    #[arg(help = "Path to the draw.io document")]
    pub document: String,

    /// Component kinds the document is expected to contain (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub expect: Vec<String>,
}
