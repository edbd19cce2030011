use crate::models::{CurrentUser, MemberRole, Workspace};

/// Read-only view of who is signed in and which workspace is active.
/// Login/logout and token lifecycle belong to the identity provider, not
/// this crate; the pipeline only consults the membership list.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub current_user: CurrentUser,
    pub workspace: Workspace,
}

impl SessionContext {
    pub fn new(current_user: CurrentUser, workspace: Workspace) -> Self {
        Self {
            current_user,
            workspace,
        }
    }

    pub fn role_of(&self, user_id: &str) -> Option<MemberRole> {
        self.workspace
            .members
            .iter()
            .find(|member| member.user_id == user_id)
            .map(|member| member.role)
    }

    pub fn current_role(&self) -> Option<MemberRole> {
        self.role_of(&self.current_user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionContext;
    use crate::models::{CurrentUser, MemberRole, Workspace, WorkspaceMember};

    #[test]
    fn resolves_current_role_from_membership() {
        let session = SessionContext::new(
            CurrentUser {
                id: "u1".to_string(),
                email: "ana@example.com".to_string(),
            },
            Workspace {
                id: "w1".to_string(),
                name: "Acme".to_string(),
                members: vec![
                    WorkspaceMember {
                        user_id: "u1".to_string(),
                        email: "ana@example.com".to_string(),
                        role: MemberRole::Editor,
                    },
                    WorkspaceMember {
                        user_id: "u2".to_string(),
                        email: "bo@example.com".to_string(),
                        role: MemberRole::Viewer,
                    },
                ],
            },
        );

        assert_eq!(session.current_role(), Some(MemberRole::Editor));
        assert_eq!(session.role_of("u2"), Some(MemberRole::Viewer));
        assert_eq!(session.role_of("u3"), None);
    }
}
