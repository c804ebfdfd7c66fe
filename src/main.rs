//! Ampress - a static site generator for markdown blogs.

mod build;
mod cli;
mod config;
mod content;
mod generator;
mod init;
mod logger;
mod render;
mod serve;
mod utils;

use anyhow::Result;
use build::Builder;
use clap::Parser;
use cli::{Cli, Commands};
use config::SitePaths;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log!("error"; "{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let paths = SitePaths::with_overrides(root, cli.content.as_deref(), cli.output.as_deref());

    match &cli.command {
        Commands::Init { name } => init::new_site(&root.join(name)),
        Commands::New { title } => init::new_post(&paths, title),
        Commands::Build { build_args } => Builder::new(paths, build_args.options()).build(),
        Commands::Serve {
            build_args,
            interface,
            port,
            no_watch,
        } => serve::serve_site(paths, build_args.options(), interface, *port, !no_watch),
    }
}
