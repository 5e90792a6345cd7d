//! Seed command
//!
//! Usage: folio seed show <PATH>

use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{CliResult, Context, Site};

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file and print the resulting tree
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Path to seed YAML file
    pub path: PathBuf,
}

pub fn execute(context: &Context, args: SeedArgs) -> CliResult<()> {
    match args.command {
        SeedCommand::Show(show_args) => execute_show(context, show_args),
    }
}

fn execute_show(context: &Context, args: ShowArgs) -> CliResult<()> {
    let site = Site::open(context, &args.path)?;
    println!("digest: {}", site.report.digest);
    println!(
        "imported: {} content types, {} documents, {} published",
        site.report.content_types, site.report.documents, site.report.published
    );
    site.print_tree()
}
