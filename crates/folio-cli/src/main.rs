//! Folio CLI
//!
//! Command-line interface for running content operations against a seeded
//! in-memory site

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Folio - versioned multi-culture content tree", long_about = None)]
struct Cli {
    /// Directory holding default.toml / <env>.toml / local.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings environment name
    #[arg(long, global = true, default_value = "development")]
    env: String,

    /// Log operations to stdout
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed operations
    Seed(commands::seed::SeedArgs),
    /// Save and publish one document
    Publish(commands::publish::PublishArgs),
    /// Publish a document and its descendants
    PublishBranch(commands::publish::PublishBranchArgs),
    /// Unpublish a document or one of its cultures
    Unpublish(commands::publish::UnpublishArgs),
    /// Move a document to the recycle bin
    Trash(commands::tree::DocArgs),
    /// Move a document under another parent
    Move(commands::tree::MoveArgs),
    /// Delete a document and its descendants
    Delete(commands::tree::DocArgs),
    /// Reorder siblings
    Sort(commands::tree::SortArgs),
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        init(Profile::Development);
    }

    let context = commands::Context {
        config: cli.config,
        env: cli.env,
    };
    let result = match cli.command {
        Commands::Seed(args) => commands::seed::execute(&context, args),
        Commands::Publish(args) => commands::publish::execute_publish(&context, args),
        Commands::PublishBranch(args) => commands::publish::execute_branch(&context, args),
        Commands::Unpublish(args) => commands::publish::execute_unpublish(&context, args),
        Commands::Trash(args) => commands::tree::execute_trash(&context, args),
        Commands::Move(args) => commands::tree::execute_move(&context, args),
        Commands::Delete(args) => commands::tree::execute_delete(&context, args),
        Commands::Sort(args) => commands::tree::execute_sort(&context, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
