//! Release/expire dates attached to a document
//!
//! The core only reads schedules and clears entries it has consumed.
//! Invariant documents use entries without a culture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleAction {
    Release,
    Expire,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub culture: Option<String>,
    pub action: ScheduleAction,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSchedule {
    entries: Vec<ScheduleEntry>,
}

impl ContentSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, culture: Option<&str>, action: ScheduleAction, date: DateTime<Utc>) {
        self.entries.push(ScheduleEntry {
            culture: culture.map(str::to_lowercase),
            action,
            date,
        });
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matching<'a>(
        &'a self,
        culture: Option<&'a str>,
        action: ScheduleAction,
    ) -> impl Iterator<Item = &'a ScheduleEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.action == action && e.culture.as_deref() == culture)
    }

    /// A release date still in the future
    pub fn is_awaiting_release(&self, culture: Option<&str>, now: DateTime<Utc>) -> bool {
        self.matching(culture, ScheduleAction::Release)
            .any(|e| e.date > now)
    }

    /// An expire date already reached
    pub fn has_expired(&self, culture: Option<&str>, now: DateTime<Utc>) -> bool {
        self.matching(culture, ScheduleAction::Expire)
            .any(|e| e.date <= now)
    }

    /// Entries of `action` due at `date`, oldest first
    pub fn pending(&self, action: ScheduleAction, date: DateTime<Utc>) -> Vec<ScheduleEntry> {
        let mut due: Vec<ScheduleEntry> = self
            .entries
            .iter()
            .filter(|e| e.action == action && e.date <= date)
            .cloned()
            .collect();
        due.sort_by_key(|e| e.date);
        due
    }

    pub fn remove(&mut self, entry: &ScheduleEntry) {
        self.entries.retain(|e| e != entry);
    }

    /// Remove every entry of `action` due at `date`; returns how many went
    pub fn clear_pending(&mut self, action: ScheduleAction, date: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.action == action && e.date <= date));
        before - self.entries.len()
    }
}
