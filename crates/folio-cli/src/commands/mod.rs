//! Shared plumbing: every command seeds a fresh in-memory site, runs one
//! operation and prints what it announced

pub mod publish;
pub mod seed;
pub mod tree;

use std::error::Error;
use std::path::{Path, PathBuf};

use folio_core::model::Document;
use folio_core::settings::Settings;
use folio_core::types::{DocumentId, RECYCLE_BIN_ID, ROOT_ID};
use folio_engine::{import_seed_file, Collaborators, ContentService, ImportReport, OperationOutcome};
use folio_store::{RecordingAudit, RecordingCacheRefresher};

pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// Global options
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub env: String,
}

impl Context {
    fn settings(&self) -> CliResult<Settings> {
        match &self.config {
            Some(dir) => Ok(Settings::load_from_sources(dir, &self.env)?),
            None => Ok(Settings::default()),
        }
    }
}

/// A seeded service plus the recorders wired into it
pub struct Site {
    pub service: ContentService,
    pub report: ImportReport,
    pub audit: RecordingAudit,
}

impl Site {
    pub fn open(context: &Context, seed: &Path) -> CliResult<Self> {
        let cache = RecordingCacheRefresher::new();
        let audit = RecordingAudit::new();
        let mut collaborators = Collaborators::in_memory();
        collaborators.cache = Box::new(cache.clone());
        collaborators.audit = Box::new(audit.clone());

        let mut service = ContentService::new(context.settings()?, collaborators)?;
        let report = import_seed_file(&mut service, seed)?;
        cache.clear();
        audit.clear();
        Ok(Self {
            service,
            report,
            audit,
        })
    }

    /// A document by seed label, or by numeric id
    pub fn resolve(&self, reference: &str) -> CliResult<DocumentId> {
        match reference {
            "root" => return Ok(ROOT_ID),
            "bin" => return Ok(RECYCLE_BIN_ID),
            _ => {}
        }
        if let Some(id) = self.report.id_of(reference) {
            return Ok(id);
        }
        reference
            .parse::<DocumentId>()
            .map_err(|_| format!("unknown document '{}'", reference).into())
    }

    pub fn document(&self, reference: &str) -> CliResult<Document> {
        let id = self.resolve(reference)?;
        Ok(self.service.get_by_id(id)?)
    }

    /// Events, cache message and audit lines of an operation
    pub fn print_outcome<T>(&self, outcome: &OperationOutcome<T>) {
        println!("events:");
        for event in &outcome.events {
            println!("  {}", event);
        }
        println!("cache: {}", outcome.message);
        for line in self.audit.lines() {
            println!("audit: {}", line);
        }
    }

    /// The content tree and the recycle bin with each node's visible state
    pub fn print_tree(&self) -> CliResult<()> {
        self.print_children(ROOT_ID, 0)?;
        let trashed = self.service.children(RECYCLE_BIN_ID)?;
        if !trashed.is_empty() {
            println!("recycle bin:");
            self.print_children(RECYCLE_BIN_ID, 1)?;
        }
        Ok(())
    }

    fn print_children(&self, parent_id: DocumentId, depth: usize) -> CliResult<()> {
        for doc in self.service.children(parent_id)? {
            let state = match (doc.published, self.service.is_path_published(doc.id())?) {
                (true, true) => 'p',
                (true, false) => 'm',
                (false, _) => 'u',
            };
            let mut line = format!(
                "{}{} ({}) [{}]",
                "  ".repeat(depth),
                doc.name.as_deref().unwrap_or_default(),
                doc.id(),
                state
            );
            let cultures = doc.cultures.published();
            if doc.varies_by_culture() && !cultures.is_empty() {
                let cultures: Vec<String> = cultures.into_iter().collect();
                line.push_str(&format!(" {{{}}}", cultures.join(",")));
            }
            println!("{}", line);
            self.print_children(doc.id(), depth + 1)?;
        }
        Ok(())
    }
}
