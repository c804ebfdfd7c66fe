//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ampress static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Minify the html content
    #[arg(short, long)]
    pub minify: bool,

    /// Skip AMP variant generation
    #[arg(long)]
    pub no_amp: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Clears the output directory and rebuilds the site
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Serve the site, rebuilding on change
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Interface to bind on
        #[arg(short, long, default_value = "127.0.0.1")]
        interface: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 4000)]
        port: u16,

        /// Disable watching for changes
        #[arg(long)]
        no_watch: bool,
    },

    /// Scaffold a new site
    Init {
        /// Directory to create the site in
        name: PathBuf,
    },

    /// Create a new dated post
    New {
        /// Post title
        title: String,
    },
}

impl BuildArgs {
    pub fn options(&self) -> crate::config::BuildOptions {
        crate::config::BuildOptions {
            amp: !self.no_amp,
            minify: self.minify,
        }
    }
}
