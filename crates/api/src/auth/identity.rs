use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;
use infra::models::Role;

/// Who is calling. Resolved once per request (or per WebSocket connection)
/// before any resolver runs.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(AuthUser),
}

impl Identity {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    pub fn require_user(&self) -> Result<AuthUser, AppError> {
        self.user()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }

    pub fn require_admin(&self) -> Result<Admin, AppError> {
        let user = self.require_user()?;
        if user.role != Role::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Admin(user))
    }
}

/// A caller whose token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AppError::Unauthorized(format!("Invalid user ID: {}", e)))?;
        Ok(Self {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Proof that the caller holds the ADMIN role. Only `Identity::require_admin`
/// constructs one, so directory writes can demand it by type.
#[derive(Debug, Clone)]
pub struct Admin(AuthUser);

impl Admin {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}
