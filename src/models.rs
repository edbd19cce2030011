use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Client,
    ChannelItem,
    StrategyMatrixItem,
    RdcIdea,
    PlanningItem,
    FinanceEntry,
    Task,
    Collaborator,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Client => "clients",
            Self::ChannelItem => "channel_items",
            Self::StrategyMatrixItem => "strategy_matrix_items",
            Self::RdcIdea => "rdc_ideas",
            Self::PlanningItem => "planning_items",
            Self::FinanceEntry => "finance_entries",
            Self::Task => "tasks",
            Self::Collaborator => "collaborators",
        }
    }

    pub fn all() -> [EntityKind; 8] {
        [
            Self::Client,
            Self::ChannelItem,
            Self::StrategyMatrixItem,
            Self::RdcIdea,
            Self::PlanningItem,
            Self::FinanceEntry,
            Self::Task,
            Self::Collaborator,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientStatus {
    Prospect,
    Active,
    Paused,
    Ended,
}

impl ClientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prospect => "prospect",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinanceKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Categorical recommendation derived from an RDC score. Never edited
/// directly; recomputed by the scorer whenever a factor changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    FillInFactors,
    ImplementNow,
    AdjustAndTest,
    DiscardAndRedirect,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FillInFactors => "Fill in R/D/C",
            Self::ImplementNow => "Implement now",
            Self::AdjustAndTest => "Adjust and test",
            Self::DiscardAndRedirect => "Discard and redirect",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientFields {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub status: Option<ClientStatus>,
    pub monthly_fee_cents: Option<i64>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelItemFields {
    pub channel: String,
    pub objective: String,
    pub format: String,
    pub frequency: String,
    pub responsible: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyMatrixFields {
    pub content_type: String,
    pub funnel_stage: String,
    pub objective: String,
    pub example: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RdcIdeaFields {
    pub title: String,
    /// 0 means the factor has not been filled in yet.
    pub resolution: u32,
    pub demand: u32,
    pub competition: u32,
    pub score: u32,
    pub decision: Option<Decision>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanningItemFields {
    pub title: String,
    pub channel: String,
    pub format: String,
    pub status: String,
    pub publish_date: Option<NaiveDate>,
    pub responsible: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FinanceEntryFields {
    pub description: String,
    pub entry_kind: Option<FinanceKind>,
    pub amount_cents: i64,
    pub category: String,
    pub entry_date: Option<NaiveDate>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub actor: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assignee: String,
    /// Append-only; the pipeline preserves prior entries on every update.
    pub activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CollaboratorFields {
    pub name: String,
    pub role_title: String,
    pub email: String,
    pub hourly_rate_cents: i64,
    pub hours_logged: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RecordBody {
    Client(ClientFields),
    ChannelItem(ChannelItemFields),
    StrategyMatrixItem(StrategyMatrixFields),
    RdcIdea(RdcIdeaFields),
    PlanningItem(PlanningItemFields),
    FinanceEntry(FinanceEntryFields),
    Task(TaskFields),
    Collaborator(CollaboratorFields),
}

impl RecordBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Client(_) => EntityKind::Client,
            Self::ChannelItem(_) => EntityKind::ChannelItem,
            Self::StrategyMatrixItem(_) => EntityKind::StrategyMatrixItem,
            Self::RdcIdea(_) => EntityKind::RdcIdea,
            Self::PlanningItem(_) => EntityKind::PlanningItem,
            Self::FinanceEntry(_) => EntityKind::FinanceEntry,
            Self::Task(_) => EntityKind::Task,
            Self::Collaborator(_) => EntityKind::Collaborator,
        }
    }
}

/// One row of one entity collection. `last_modified_at` is the version
/// stamp used by reconciliation; legacy rows without one compare as
/// epoch-zero (older than anything stamped).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub workspace_id: String,
    #[serde(default, deserialize_with = "soft_timestamp")]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(flatten)]
    pub body: RecordBody,
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }
}

/// Malformed or missing timestamps never fail a load; they downgrade to
/// `None` and sort before any stamped version.
fn soft_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        serde_json::Value::String(text) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        _ => None,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberRole {
    Owner,
    Editor,
    Viewer,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn can_mutate(self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMember {
    pub user_id: String,
    pub email: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub members: Vec<WorkspaceMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordPayload {
    pub workspace_id: String,
    pub body: RecordBody,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordPayload {
    pub id: String,
    pub body: RecordBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordPayload {
    pub id: String,
    pub kind: EntityKind,
    pub confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecordPayload {
    pub id: String,
    pub kind: EntityKind,
    pub archived: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub database_path: String,
    pub log_dir: String,
    pub surface_info_notifications: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: "agencydesk.db".to_string(),
            log_dir: "logs".to_string(),
            surface_info_notifications: true,
        }
    }
}
