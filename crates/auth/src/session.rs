use serde::{Deserialize, Serialize};

use shopwise_core::UserId;

use crate::{Role, SessionClaims};

/// An authenticated session: who is signed in, with which role, and the raw
/// token that proves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
    pub username: String,
    pub access_token: String,
}

impl Session {
    pub fn from_claims(claims: SessionClaims, access_token: impl Into<String>) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            username: claims.username,
            access_token: access_token.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
