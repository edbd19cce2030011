use crate::errors::{AppError, AppResult};
use crate::models::{EntityKind, Record};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// All entity collections for the active workspace. Fields are private so
/// every write funnels through the methods below; the pipeline is the only
/// caller that holds a handle with write intent.
#[derive(Debug, Default)]
pub struct WorkspaceState {
    collections: HashMap<EntityKind, Vec<Record>>,
}

impl WorkspaceState {
    pub fn snapshot(&self, kind: EntityKind) -> Vec<Record> {
        self.collections.get(&kind).cloned().unwrap_or_default()
    }

    /// Default view of a collection: archived records stay stored but are
    /// filtered out here.
    pub fn snapshot_active(&self, kind: EntityKind) -> Vec<Record> {
        self.collections
            .get(&kind)
            .map(|records| records.iter().filter(|r| !r.archived).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Record> {
        self.collections
            .get(&kind)
            .and_then(|records| records.iter().find(|record| record.id == id))
    }

    pub fn insert(&mut self, record: Record) {
        self.collections.entry(record.kind()).or_default().push(record);
    }

    pub fn replace(&mut self, record: Record) -> AppResult<()> {
        let kind = record.kind();
        let collection = self
            .collections
            .get_mut(&kind)
            .ok_or_else(|| AppError::NotFound(format!("{}: no collection loaded", kind.table())))?;
        let slot = collection
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("{}: no record with id {}", kind.table(), record.id))
            })?;
        *slot = record;
        Ok(())
    }

    pub fn remove(&mut self, kind: EntityKind, id: &str) -> Option<Record> {
        let collection = self.collections.get_mut(&kind)?;
        let index = collection.iter().position(|record| record.id == id)?;
        Some(collection.remove(index))
    }

    /// Toggle the soft-delete flag, stamping the new version. The record
    /// stays in the collection either way.
    pub fn set_archived(
        &mut self,
        kind: EntityKind,
        id: &str,
        archived: bool,
        stamp: DateTime<Utc>,
    ) -> AppResult<Record> {
        let collection = self
            .collections
            .get_mut(&kind)
            .ok_or_else(|| AppError::NotFound(format!("{}: no collection loaded", kind.table())))?;
        let record = collection
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| AppError::NotFound(format!("{}: no record with id {}", kind.table(), id)))?;
        record.archived = archived;
        record.last_modified_at = Some(stamp);
        Ok(record.clone())
    }

    /// Swap a whole collection after reconciliation.
    pub fn replace_collection(&mut self, kind: EntityKind, records: Vec<Record>) {
        self.collections.insert(kind, records);
    }

    pub fn clear(&mut self) {
        self.collections.clear();
    }
}

pub type StateHandle = Arc<RwLock<WorkspaceState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(WorkspaceState::default()))
}

#[cfg(test)]
mod tests {
    use super::WorkspaceState;
    use crate::models::{ClientFields, EntityKind, Record, RecordBody};

    fn client(id: &str, name: &str) -> Record {
        Record {
            id: id.to_string(),
            workspace_id: "w1".to_string(),
            last_modified_at: None,
            archived: false,
            body: RecordBody::Client(ClientFields {
                name: name.to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn insert_and_snapshot() {
        let mut state = WorkspaceState::default();
        state.insert(client("c1", "Acme"));
        let snapshot = state.snapshot(EntityKind::Client);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "c1");
    }

    #[test]
    fn replace_requires_existing_id() {
        let mut state = WorkspaceState::default();
        state.insert(client("c1", "Acme"));
        assert!(state.replace(client("c1", "Acme Studio")).is_ok());
        assert!(state.replace(client("c2", "Ghost")).is_err());
    }

    #[test]
    fn remove_returns_the_removed_record() {
        let mut state = WorkspaceState::default();
        state.insert(client("c1", "Acme"));
        let removed = state.remove(EntityKind::Client, "c1").expect("record removed");
        assert_eq!(removed.id, "c1");
        assert!(state.snapshot(EntityKind::Client).is_empty());
    }

    #[test]
    fn archive_toggles_without_removal() {
        let mut state = WorkspaceState::default();
        state.insert(client("c1", "Acme"));
        let stamp = chrono::Utc::now();
        let archived = state
            .set_archived(EntityKind::Client, "c1", true, stamp)
            .expect("archive applies");
        assert!(archived.archived);
        assert_eq!(archived.last_modified_at, Some(stamp));
        assert_eq!(state.snapshot(EntityKind::Client).len(), 1);
        let restored = state
            .set_archived(EntityKind::Client, "c1", false, chrono::Utc::now())
            .expect("unarchive applies");
        assert!(!restored.archived);
    }

    #[test]
    fn active_snapshot_hides_archived_records() {
        let mut state = WorkspaceState::default();
        state.insert(client("c1", "Acme"));
        state.insert(client("c2", "Globex"));
        state
            .set_archived(EntityKind::Client, "c2", true, chrono::Utc::now())
            .expect("archive applies");
        assert_eq!(state.snapshot(EntityKind::Client).len(), 2);
        let active = state.snapshot_active(EntityKind::Client);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "c1");
    }
}
