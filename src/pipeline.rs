use crate::errors::{AppError, AppResult};
use crate::merge::reconcile;
use crate::models::{
    ArchiveRecordPayload, CreateRecordPayload, DeleteRecordPayload, EntityKind, Record, RecordBody,
    TaskFields, UpdateRecordPayload,
};
use crate::notify::{NotificationKind, Notifier};
use crate::policy::{MutationGuard, MutationKind};
use crate::scoring::{apply_scoring, clamp_rating};
use crate::session::SessionContext;
use crate::state::{new_state_handle, StateHandle};
use crate::store::StoreBackend;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Terminal state of one mutation. Every mutation applies optimistically
/// first; only creates roll back when the store rejects the write.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied(Record),
    RolledBack { id: String, error: String },
}

impl MutationOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Applied(record) => Some(record),
            Self::RolledBack { .. } => None,
        }
    }
}

/// Coordinates every record mutation across local state and the durable
/// store. Holds the only write handle to the entity collections.
///
/// Mutations are not serialized against each other: two rapid edits to the
/// same record race, and the store's eventual state is whichever write
/// lands last. Reconciliation on the next refresh is the only cross-client
/// ordering mechanism.
pub struct MutationPipeline {
    state: StateHandle,
    store: Arc<dyn StoreBackend>,
    notifier: Arc<dyn Notifier>,
    guard: MutationGuard,
    session: RwLock<SessionContext>,
}

impl MutationPipeline {
    pub fn new(
        store: Arc<dyn StoreBackend>,
        notifier: Arc<dyn Notifier>,
        session: SessionContext,
    ) -> Self {
        Self {
            state: new_state_handle(),
            store,
            notifier,
            guard: MutationGuard::new(),
            session: RwLock::new(session),
        }
    }

    /// Read access for the view layer. Writes still only happen through
    /// the pipeline; the handle exposes setters but no other component
    /// holds it with write intent.
    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    pub async fn snapshot(&self, kind: EntityKind) -> Vec<Record> {
        self.state.read().await.snapshot(kind)
    }

    pub async fn snapshot_active(&self, kind: EntityKind) -> Vec<Record> {
        self.state.read().await.snapshot_active(kind)
    }

    async fn check_guard(&self, mutation: MutationKind) -> AppResult<()> {
        let session = self.session.read().await;
        self.guard
            .check(&session.current_user, &session.workspace, mutation)
    }

    pub async fn create(&self, payload: CreateRecordPayload) -> AppResult<MutationOutcome> {
        self.check_guard(MutationKind::Create).await?;

        let mut body = payload.body;
        if let RecordBody::RdcIdea(idea) = &mut body {
            apply_scoring(idea);
        }

        let record = Record {
            id: Uuid::new_v4().to_string(),
            workspace_id: payload.workspace_id,
            last_modified_at: Some(Utc::now()),
            archived: payload.archived.unwrap_or(false),
            body,
        };
        let kind = record.kind();

        // Optimistic append; the UI sees the record before the store does.
        self.state.write().await.insert(record.clone());

        if let Err(error) = self.store.upsert(kind, &record).await {
            self.state.write().await.remove(kind, &record.id);
            tracing::warn!(table = kind.table(), id = %record.id, %error, "create rolled back");
            self.notifier
                .notify(
                    NotificationKind::Error,
                    "Save failed",
                    &format!("{}/{}: {}", kind.table(), record.id, error),
                )
                .await;
            return Ok(MutationOutcome::RolledBack {
                id: record.id,
                error: error.to_string(),
            });
        }

        self.notifier
            .notify(NotificationKind::Success, "Saved", &format!("{} created", kind.table()))
            .await;
        Ok(MutationOutcome::Applied(record))
    }

    pub async fn update(&self, payload: UpdateRecordPayload) -> AppResult<MutationOutcome> {
        self.check_guard(MutationKind::Update).await?;

        let kind = payload.body.kind();
        let existing = {
            let state = self.state.read().await;
            state
                .get(kind, &payload.id)
                .cloned()
                .ok_or_else(|| {
                    AppError::NotFound(format!("{}: no record with id {}", kind.table(), payload.id))
                })?
        };

        let mut body = payload.body;
        match &mut body {
            RecordBody::RdcIdea(idea) => apply_scoring(idea),
            RecordBody::Task(task) => {
                if let RecordBody::Task(previous) = &existing.body {
                    let session = self.session.read().await;
                    append_activity(task, previous, &session.current_user.email);
                }
            }
            _ => {}
        }

        let record = Record {
            id: existing.id.clone(),
            workspace_id: existing.workspace_id.clone(),
            last_modified_at: Some(Utc::now()),
            archived: existing.archived,
            body,
        };

        self.state.write().await.replace(record.clone())?;

        // Update has no rollback: a store failure leaves the local value
        // in place and the mismatch is surfaced instead of reverted.
        if let Err(error) = self.store.update(kind, &record).await {
            tracing::warn!(table = kind.table(), id = %record.id, %error, "update not persisted");
            self.notifier
                .notify(
                    NotificationKind::Error,
                    "Save failed",
                    &format!("{}/{}: {}", kind.table(), record.id, error),
                )
                .await;
        }

        Ok(MutationOutcome::Applied(record))
    }

    /// Update path for the three RDC factor fields, taking the raw text
    /// the user typed. Values are clamped before the regular update runs.
    pub async fn update_rdc_factors(
        &self,
        id: &str,
        resolution: Option<&str>,
        demand: Option<&str>,
        competition: Option<&str>,
    ) -> AppResult<MutationOutcome> {
        let existing = {
            let state = self.state.read().await;
            state
                .get(EntityKind::RdcIdea, id)
                .cloned()
                .ok_or_else(|| {
                    AppError::NotFound(format!("rdc_ideas: no record with id {}", id))
                })?
        };

        let RecordBody::RdcIdea(mut idea) = existing.body else {
            return Err(AppError::Internal(format!(
                "rdc_ideas: record {} has a mismatched body",
                id
            )));
        };
        if let Some(raw) = resolution {
            idea.resolution = clamp_rating(raw);
        }
        if let Some(raw) = demand {
            idea.demand = clamp_rating(raw);
        }
        if let Some(raw) = competition {
            idea.competition = clamp_rating(raw);
        }

        self.update(UpdateRecordPayload {
            id: id.to_string(),
            body: RecordBody::RdcIdea(idea),
        })
        .await
    }

    /// Hard delete. Requires the typed confirmation phrase; the remote
    /// delete is fire-and-forget with no rollback on failure.
    pub async fn delete(&self, payload: DeleteRecordPayload) -> AppResult<MutationOutcome> {
        self.check_guard(MutationKind::Delete).await?;
        self.guard.check_delete_confirmation(&payload.confirmation)?;

        let removed = self
            .state
            .write()
            .await
            .remove(payload.kind, &payload.id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{}: no record with id {}",
                    payload.kind.table(),
                    payload.id
                ))
            })?;

        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let kind = payload.kind;
        let id = payload.id.clone();
        tokio::spawn(async move {
            if let Err(error) = store.delete(kind, &id).await {
                tracing::warn!(table = kind.table(), %id, %error, "remote delete failed");
                notifier
                    .notify(
                        NotificationKind::Error,
                        "Delete failed",
                        &format!("{}/{}: {}", kind.table(), id, error),
                    )
                    .await;
            }
        });

        Ok(MutationOutcome::Applied(removed))
    }

    /// Reversible soft delete; no confirmation required.
    pub async fn set_archived(&self, payload: ArchiveRecordPayload) -> AppResult<MutationOutcome> {
        self.check_guard(MutationKind::Archive).await?;

        let record = self.state.write().await.set_archived(
            payload.kind,
            &payload.id,
            payload.archived,
            Utc::now(),
        )?;

        if let Err(error) = self.store.update(payload.kind, &record).await {
            tracing::warn!(
                table = payload.kind.table(),
                id = %record.id,
                %error,
                "archive flag not persisted"
            );
            self.notifier
                .notify(
                    NotificationKind::Error,
                    "Save failed",
                    &format!("{}/{}: {}", payload.kind.table(), record.id, error),
                )
                .await;
        }

        Ok(MutationOutcome::Applied(record))
    }

    /// Fold the latest durable snapshot for one entity kind into local
    /// state. Runs on workspace load and reconnect.
    pub async fn refresh(&self, kind: EntityKind) -> AppResult<()> {
        let workspace_id = self.session.read().await.workspace.id.clone();
        let remote = match self.store.fetch_all(kind, &workspace_id).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(table = kind.table(), %error, "refresh fetch failed");
                self.notifier
                    .notify(
                        NotificationKind::Warning,
                        "Refresh failed",
                        &format!("{}: {}", kind.table(), error),
                    )
                    .await;
                return Err(error);
            }
        };

        let mut state = self.state.write().await;
        let merged = reconcile(&state.snapshot(kind), &remote);
        state.replace_collection(kind, merged);
        Ok(())
    }

    pub async fn refresh_workspace(&self) -> AppResult<()> {
        for kind in EntityKind::all() {
            self.refresh(kind).await?;
        }
        Ok(())
    }

    /// Swap the active workspace: local collections are dropped and
    /// reloaded from the store under the new membership.
    pub async fn switch_workspace(&self, session: SessionContext) -> AppResult<()> {
        {
            let mut current = self.session.write().await;
            *current = session;
        }
        self.state.write().await.clear();
        self.refresh_workspace().await
    }
}

/// Append one immutable activity entry describing an edit. Prior entries
/// are carried over from the stored record so callers cannot rewrite
/// history by sending a truncated log.
fn append_activity(task: &mut TaskFields, previous: &TaskFields, actor: &str) {
    let mut changed = Vec::new();
    if task.title != previous.title {
        changed.push("title");
    }
    if task.description != previous.description {
        changed.push("description");
    }
    if task.status != previous.status {
        changed.push("status");
    }
    if task.priority != previous.priority {
        changed.push("priority");
    }
    if task.due_date != previous.due_date {
        changed.push("due date");
    }
    if task.assignee != previous.assignee {
        changed.push("assignee");
    }

    let summary = if changed.is_empty() {
        "edited".to_string()
    } else {
        format!("changed {}", changed.join(", "))
    };

    task.activity = previous.activity.clone();
    task.activity.push(crate::models::ActivityEntry {
        at: Utc::now(),
        actor: actor.to_string(),
        summary,
    });
}
