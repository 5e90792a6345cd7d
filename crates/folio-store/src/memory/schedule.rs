use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use folio_core::collaborators::{ScheduleProvider, Transactional};
use folio_core::errors::{FolioError, Result};
use folio_core::model::{ContentSchedule, ScheduleAction};
use folio_core_types::DocumentId;

/// Release/expire schedules per document
#[derive(Debug, Default)]
pub struct ScheduleBook {
    schedules: BTreeMap<DocumentId, ContentSchedule>,
    snapshot: Option<BTreeMap<DocumentId, ContentSchedule>>,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transactional for ScheduleBook {
    fn begin_scope(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(FolioError::ScopeAlreadyOpen);
        }
        self.snapshot = Some(self.schedules.clone());
        Ok(())
    }

    fn complete_scope(&mut self) -> Result<()> {
        self.snapshot.take().ok_or(FolioError::NoActiveScope)?;
        Ok(())
    }

    fn rollback_scope(&mut self) -> Result<()> {
        self.schedules = self.snapshot.take().ok_or(FolioError::NoActiveScope)?;
        Ok(())
    }
}

impl ScheduleProvider for ScheduleBook {
    fn get_schedule(&self, id: DocumentId) -> ContentSchedule {
        self.schedules.get(&id).cloned().unwrap_or_default()
    }

    fn set_schedule(&mut self, id: DocumentId, schedule: ContentSchedule) {
        if schedule.is_empty() {
            self.schedules.remove(&id);
        } else {
            self.schedules.insert(id, schedule);
        }
    }

    fn due(&self, action: ScheduleAction, date: DateTime<Utc>) -> Vec<DocumentId> {
        self.schedules
            .iter()
            .filter(|(_, s)| !s.pending(action, date).is_empty())
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_due_lists_documents_by_action() {
        let now = Utc::now();
        let mut book = ScheduleBook::new();
        let mut s = ContentSchedule::new();
        s.add(None, ScheduleAction::Release, now - Duration::minutes(5));
        book.set_schedule(7, s);
        let mut later = ContentSchedule::new();
        later.add(None, ScheduleAction::Release, now + Duration::days(1));
        book.set_schedule(8, later);

        assert_eq!(book.due(ScheduleAction::Release, now), vec![7]);
        assert!(book.due(ScheduleAction::Expire, now).is_empty());
    }

    #[test]
    fn test_rollback_restores_schedules() {
        let mut book = ScheduleBook::new();
        book.begin_scope().expect("Should begin");
        book.set_schedule(1, {
            let mut s = ContentSchedule::new();
            s.add(None, ScheduleAction::Expire, Utc::now());
            s
        });
        book.rollback_scope().expect("Should roll back");
        assert!(book.get_schedule(1).is_empty());
    }
}
