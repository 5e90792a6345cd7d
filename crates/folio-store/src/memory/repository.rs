use std::collections::BTreeMap;

use folio_core::collaborators::{ContentRepository, Transactional};
use folio_core::errors::{FolioError, Result};
use folio_core::model::Document;
use folio_core_types::{ContentTypeId, DocumentId};

const FIRST_ID: DocumentId = 1000;

#[derive(Debug, Clone)]
struct RepositoryState {
    documents: BTreeMap<DocumentId, Document>,
    next_id: DocumentId,
}

impl Default for RepositoryState {
    fn default() -> Self {
        Self {
            documents: BTreeMap::new(),
            next_id: FIRST_ID,
        }
    }
}

/// Document store keyed by id
#[derive(Debug, Default)]
pub struct MemoryContentRepository {
    state: RepositoryState,
    snapshot: Option<RepositoryState>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.documents.is_empty()
    }

    pub fn in_scope(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl Transactional for MemoryContentRepository {
    fn begin_scope(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(FolioError::ScopeAlreadyOpen);
        }
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn complete_scope(&mut self) -> Result<()> {
        self.snapshot.take().ok_or(FolioError::NoActiveScope)?;
        Ok(())
    }

    fn rollback_scope(&mut self) -> Result<()> {
        let snapshot = self.snapshot.take().ok_or(FolioError::NoActiveScope)?;
        tracing::debug!(
            discarded = self.state.documents.len() as i64 - snapshot.documents.len() as i64,
            "Rolling back content scope"
        );
        self.state = snapshot;
        Ok(())
    }
}

impl ContentRepository for MemoryContentRepository {
    fn next_id(&mut self) -> DocumentId {
        let id = self.state.next_id;
        self.state.next_id += 1;
        id
    }

    fn get(&self, id: DocumentId) -> Result<Document> {
        self.state
            .documents
            .get(&id)
            .cloned()
            .ok_or(FolioError::DocumentNotFound { document_id: id })
    }

    fn exists(&self, id: DocumentId) -> bool {
        self.state.documents.contains_key(&id)
    }

    fn save(&mut self, doc: &Document) -> Result<()> {
        if !doc.has_identity() {
            return Err(FolioError::IllegalState {
                document_id: doc.id(),
                action: "save".to_string(),
                reason: "document has no identity".to_string(),
            });
        }
        self.state.documents.insert(doc.id(), doc.clone());
        Ok(())
    }

    fn delete(&mut self, id: DocumentId) -> Result<()> {
        self.state
            .documents
            .remove(&id)
            .map(|_| ())
            .ok_or(FolioError::DocumentNotFound { document_id: id })
    }

    fn children(&self, parent_id: DocumentId) -> Result<Vec<Document>> {
        let mut children: Vec<Document> = self
            .state
            .documents
            .values()
            .filter(|d| d.parent_id() == parent_id)
            .cloned()
            .collect();
        children.sort_by_key(|d| (d.node.sort_order, d.id()));
        Ok(children)
    }

    fn by_content_type(&self, content_type_id: ContentTypeId) -> Result<Vec<Document>> {
        Ok(self
            .state
            .documents
            .values()
            .filter(|d| d.content_type_id == content_type_id)
            .cloned()
            .collect())
    }
}
