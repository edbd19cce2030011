use crate::errors::{AppError, AppResult};
use crate::models::{CurrentUser, MemberRole, Workspace};

/// Exact phrase a user must type before a hard delete goes through.
pub const DELETE_CONFIRMATION_PHRASE: &str = "delete permanently";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Archive,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Archive => "archive",
        }
    }
}

/// Client-side gate in front of every mutation. This is a UX affordance,
/// not a security boundary; the store's own access policies are the real
/// enforcement point and live outside this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationGuard;

impl MutationGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn check(
        &self,
        user: &CurrentUser,
        workspace: &Workspace,
        mutation: MutationKind,
    ) -> AppResult<()> {
        let role = workspace
            .members
            .iter()
            .find(|member| member.user_id == user.id)
            .map(|member| member.role);

        match role {
            None => Err(AppError::Permission(format!(
                "{} is not a member of workspace '{}'",
                user.email, workspace.name
            ))),
            Some(MemberRole::Viewer) => Err(AppError::Permission(format!(
                "Viewers cannot {} records in workspace '{}'",
                mutation.as_str(),
                workspace.name
            ))),
            Some(MemberRole::Owner) | Some(MemberRole::Editor) => Ok(()),
        }
    }

    /// Hard deletes additionally require the typed confirmation phrase,
    /// checked before any state changes.
    pub fn check_delete_confirmation(&self, confirmation: &str) -> AppResult<()> {
        if confirmation != DELETE_CONFIRMATION_PHRASE {
            return Err(AppError::Validation(format!(
                "Delete not confirmed: expected the exact phrase '{}'",
                DELETE_CONFIRMATION_PHRASE
            )));
        }
        Ok(())
    }
}
