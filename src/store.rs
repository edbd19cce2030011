use crate::errors::{AppError, AppResult};
use crate::models::{EntityKind, Record};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Narrow interface to the durable store. The hosted backend lives behind
/// this trait and out of this crate; `SqliteStore` (db module) and
/// `MemoryStore` are the in-tree implementations.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn fetch_all(&self, kind: EntityKind, workspace_id: &str) -> AppResult<Vec<Record>>;
    async fn upsert(&self, kind: EntityKind, record: &Record) -> AppResult<()>;
    async fn update(&self, kind: EntityKind, record: &Record) -> AppResult<()>;
    async fn delete(&self, kind: EntityKind, id: &str) -> AppResult<()>;
}

/// HashMap-backed store for tests and demos. `fail_next` makes the next
/// write return an error so rollback paths can be exercised.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<EntityKind, Vec<Record>>>,
    fail_next: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_write(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn take_failure(&self) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Store("injected store failure".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<EntityKind, Vec<Record>>>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn fetch_all(&self, kind: EntityKind, workspace_id: &str) -> AppResult<Vec<Record>> {
        let tables = self.lock()?;
        Ok(tables
            .get(&kind)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.workspace_id == workspace_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert(&self, kind: EntityKind, record: &Record) -> AppResult<()> {
        self.take_failure()?;
        let mut tables = self.lock()?;
        let table = tables.entry(kind).or_default();
        match table.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => table.push(record.clone()),
        }
        Ok(())
    }

    async fn update(&self, kind: EntityKind, record: &Record) -> AppResult<()> {
        self.take_failure()?;
        let mut tables = self.lock()?;
        let table = tables.entry(kind).or_default();
        let existing = table
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("{}: no record with id {}", kind.table(), record.id))
            })?;
        *existing = record.clone();
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> AppResult<()> {
        self.take_failure()?;
        let mut tables = self.lock()?;
        if let Some(table) = tables.get_mut(&kind) {
            table.retain(|record| record.id != id);
        }
        Ok(())
    }
}
