use crate::errors::{AppError, AppResult};
use crate::models::{EntityKind, Record, RecordBody};
use crate::store::StoreBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Local SQLite implementation of the store interface, used for offline
/// and development setups. The hosted relational backend sits behind the
/// same trait outside this crate.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Internal(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    pub fn from_settings(settings: &crate::models::AppSettings) -> AppResult<Self> {
        Self::new(Path::new(&settings.database_path))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    fn row_to_record(
        id: String,
        workspace_id: String,
        archived: bool,
        last_modified_at: Option<String>,
        body_json: String,
    ) -> AppResult<Record> {
        let body: RecordBody = serde_json::from_str(&body_json)?;
        // Unparsable stamps downgrade to None instead of failing the load.
        let last_modified_at = last_modified_at.and_then(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc))
        });
        Ok(Record {
            id,
            workspace_id,
            last_modified_at,
            archived,
            body,
        })
    }

    fn write_record(&self, record: &Record, kind: EntityKind) -> AppResult<()> {
        let body_json = serde_json::to_string(&record.body)?;
        let stamp = record.last_modified_at.map(|at| at.to_rfc3339());
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO records (id, kind, workspace_id, archived, last_modified_at, body_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
               workspace_id = excluded.workspace_id,
               archived = excluded.archived,
               last_modified_at = excluded.last_modified_at,
               body_json = excluded.body_json",
            params![
                record.id,
                kind.table(),
                record.workspace_id,
                record.archived,
                stamp,
                body_json,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for SqliteStore {
    async fn fetch_all(&self, kind: EntityKind, workspace_id: &str) -> AppResult<Vec<Record>> {
        let conn = self.lock()?;
        let mut statement = conn.prepare(
            "SELECT id, workspace_id, archived, last_modified_at, body_json
             FROM records WHERE kind = ?1 AND workspace_id = ?2",
        )?;
        let rows = statement.query_map(params![kind.table(), workspace_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, workspace_id, archived, stamp, body_json) = row?;
            records.push(Self::row_to_record(id, workspace_id, archived, stamp, body_json)?);
        }
        Ok(records)
    }

    async fn upsert(&self, kind: EntityKind, record: &Record) -> AppResult<()> {
        self.write_record(record, kind)
    }

    async fn update(&self, kind: EntityKind, record: &Record) -> AppResult<()> {
        let body_json = serde_json::to_string(&record.body)?;
        let stamp = record.last_modified_at.map(|at| at.to_rfc3339());
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE records SET archived = ?1, last_modified_at = ?2, body_json = ?3
             WHERE id = ?4 AND kind = ?5",
            params![record.archived, stamp, body_json, record.id, kind.table()],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound(format!(
                "{}: no record with id {}",
                kind.table(),
                record.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM records WHERE id = ?1 AND kind = ?2",
            params![id, kind.table()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::models::{ClientFields, EntityKind, Record, RecordBody};
    use crate::store::StoreBackend;
    use chrono::Utc;

    fn client(id: &str, name: &str) -> Record {
        Record {
            id: id.to_string(),
            workspace_id: "w1".to_string(),
            last_modified_at: Some(Utc::now()),
            archived: false,
            body: RecordBody::Client(ClientFields {
                name: name.to_string(),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn upsert_fetch_update_delete_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SqliteStore::new(&dir.path().join("test.db")).expect("open store");

        let mut record = client("c1", "Acme");
        store.upsert(EntityKind::Client, &record).await.expect("insert");

        let fetched = store.fetch_all(EntityKind::Client, "w1").await.expect("fetch");
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0], record);

        record.archived = true;
        store.update(EntityKind::Client, &record).await.expect("update");
        let fetched = store.fetch_all(EntityKind::Client, "w1").await.expect("refetch");
        assert!(fetched[0].archived);

        store.delete(EntityKind::Client, "c1").await.expect("delete");
        let fetched = store.fetch_all(EntityKind::Client, "w1").await.expect("final fetch");
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_record_reports_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SqliteStore::new(&dir.path().join("test.db")).expect("open store");
        let result = store.update(EntityKind::Client, &client("ghost", "x")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unparsable_stamp_loads_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SqliteStore::new(&dir.path().join("test.db")).expect("open store");
        store.upsert(EntityKind::Client, &client("c1", "Acme")).await.expect("insert");
        {
            let conn = store.lock().expect("lock");
            conn.execute(
                "UPDATE records SET last_modified_at = 'garbage' WHERE id = 'c1'",
                [],
            )
            .expect("corrupt stamp");
        }
        let fetched = store.fetch_all(EntityKind::Client, "w1").await.expect("fetch");
        assert!(fetched[0].last_modified_at.is_none());
    }
}
