//! Tree commands
//!
//! Usage:
//!   folio trash <SEED> --doc <DOC>
//!   folio move <SEED> --doc <DOC> --to <DOC|root|bin>
//!   folio delete <SEED> --doc <DOC>
//!   folio sort <SEED> --doc <DOC> --doc <DOC>...

use clap::Args;
use std::path::PathBuf;

use super::{CliResult, Context, Site};

#[derive(Debug, Args)]
pub struct DocArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Seed label or id of the document
    #[arg(long)]
    pub doc: String,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Seed label or id of the document
    #[arg(long)]
    pub doc: String,

    /// New parent: a seed label, an id, `root` or `bin`
    #[arg(long)]
    pub to: String,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Siblings in their new order
    #[arg(long = "doc", required = true)]
    pub docs: Vec<String>,
}

pub fn execute_trash(context: &Context, args: DocArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let id = site.resolve(&args.doc)?;
    let outcome = site.service.move_to_recycle_bin(id)?;
    site.print_outcome(&outcome);
    site.print_tree()
}

pub fn execute_move(context: &Context, args: MoveArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let id = site.resolve(&args.doc)?;
    let parent_id = site.resolve(&args.to)?;
    let outcome = site.service.move_to(id, parent_id)?;
    site.print_outcome(&outcome);
    site.print_tree()
}

pub fn execute_delete(context: &Context, args: DocArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let id = site.resolve(&args.doc)?;
    let outcome = site.service.delete(id)?;
    println!("deleted: {}", outcome.value);
    site.print_outcome(&outcome);
    site.print_tree()
}

pub fn execute_sort(context: &Context, args: SortArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let ids = args
        .docs
        .iter()
        .map(|d| site.resolve(d))
        .collect::<CliResult<Vec<_>>>()?;
    let outcome = site.service.sort(&ids)?;
    site.print_outcome(&outcome);
    site.print_tree()
}
