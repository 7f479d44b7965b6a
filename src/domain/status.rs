use crate::domain::{auth_state::AuthorizationState, user::UserProfile};

/// Composite answer of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
    pub auth_state: AuthorizationState,
}

impl SessionStatus {
    pub fn logged_in(user: UserProfile) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user),
            auth_state: AuthorizationState::Ready,
        }
    }

    pub fn not_logged_in(auth_state: AuthorizationState) -> Self {
        Self {
            is_logged_in: false,
            user: None,
            auth_state,
        }
    }
}
