mod db;
mod errors;
mod labels;
mod merge;
mod models;
mod notify;
mod pipeline;
mod policy;
mod scoring;
mod session;
mod state;
mod store;

pub use db::SqliteStore;
pub use errors::{AppError, AppResult};
pub use labels::{display_label, field_for_label};
pub use merge::{modified_at_or_epoch, reconcile};
pub use models::{
    ActivityEntry, AppSettings, ArchiveRecordPayload, ChannelItemFields, ClientFields, ClientStatus,
    CollaboratorFields, CreateRecordPayload, CurrentUser, Decision, DeleteRecordPayload, EntityKind,
    FinanceEntryFields, FinanceKind, MemberRole, PlanningItemFields, RdcIdeaFields, Record,
    RecordBody, StrategyMatrixFields, TaskFields, TaskPriority, TaskStatus, UpdateRecordPayload,
    Workspace, WorkspaceMember,
};
pub use notify::{CapturedNotification, LogNotifier, NotificationKind, Notifier, RecordingNotifier};
pub use pipeline::{MutationOutcome, MutationPipeline};
pub use policy::{MutationGuard, MutationKind, DELETE_CONFIRMATION_PHRASE};
pub use scoring::{apply_scoring, clamp_rating, decide, parse_rating, score};
pub use session::SessionContext;
pub use store::{MemoryStore, StoreBackend};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Structured JSON logging to a daily-rolled file, filter taken from the
/// environment. Call once at startup; later calls are no-ops.
pub fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "agencydesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
