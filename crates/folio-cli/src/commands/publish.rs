//! Publishing commands
//!
//! Usage:
//!   folio publish <SEED> --doc <DOC> [--culture <CULTURE>]...
//!   folio publish-branch <SEED> --root <DOC> [--force] [--culture <CULTURE>]...
//!   folio unpublish <SEED> --doc <DOC> [--culture <CULTURE>]

use clap::Args;
use folio_core::model::CultureSelection;
use folio_core::publishing::PublishResult;
use std::path::PathBuf;

use super::{CliResult, Context, Site};

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Seed label or id of the document
    #[arg(long)]
    pub doc: String,

    /// Cultures to publish (default: all)
    #[arg(long = "culture")]
    pub cultures: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PublishBranchArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Seed label or id of the branch root
    #[arg(long)]
    pub root: String,

    /// Also publish documents that were never published
    #[arg(long)]
    pub force: bool,

    /// Cultures to publish (default: all)
    #[arg(long = "culture")]
    pub cultures: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UnpublishArgs {
    /// Path to seed YAML file
    pub seed: PathBuf,

    /// Seed label or id of the document
    #[arg(long)]
    pub doc: String,

    /// Culture to unpublish; `*` takes the whole document offline
    #[arg(long, default_value = "*")]
    pub culture: String,
}

fn selection(cultures: Vec<String>) -> CultureSelection {
    if cultures.is_empty() || cultures.iter().any(|c| c == "*") {
        CultureSelection::All
    } else {
        CultureSelection::Only(cultures)
    }
}

fn print_result(result: &PublishResult) {
    print!("result: {} {}", result.document_id, result.result);
    if !result.invalid_properties.is_empty() {
        print!(" (invalid: {})", result.invalid_properties.join(", "));
    }
    println!();
}

pub fn execute_publish(context: &Context, args: PublishArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let mut doc = site.document(&args.doc)?;
    let outcome = site
        .service
        .save_and_publish(&mut doc, selection(args.cultures))?;
    print_result(&outcome.value);
    site.print_outcome(&outcome);
    site.print_tree()
}

pub fn execute_branch(context: &Context, args: PublishBranchArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let root = site.document(&args.root)?;
    let outcome = site
        .service
        .publish_branch(&root, args.force, selection(args.cultures))?;
    for result in &outcome.value {
        print_result(result);
    }
    site.print_outcome(&outcome);
    site.print_tree()
}

pub fn execute_unpublish(context: &Context, args: UnpublishArgs) -> CliResult<()> {
    let mut site = Site::open(context, &args.seed)?;
    let mut doc = site.document(&args.doc)?;
    let outcome = site.service.unpublish(&mut doc, &args.culture)?;
    print_result(&outcome.value);
    site.print_outcome(&outcome);
    site.print_tree()
}
