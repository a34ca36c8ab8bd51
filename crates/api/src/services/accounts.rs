use uuid::Uuid;

use crate::auth::{JwtService, PasswordService};
use crate::error::{AppError, AppResult, FieldViolation};
use crate::gql::types::{AuthPayload, LoginInput, RegisterInput, Role, User};
use crate::services::validation::{ensure_valid, validate, violations_of};
use infra::models::{self, CreateUser};
use infra::Repositories;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration, login and profile lookup.
#[derive(Clone)]
pub struct AccountService {
    repos: Repositories,
    jwt: JwtService,
    passwords: PasswordService,
    allow_admin_registration: bool,
}

impl AccountService {
    pub fn new(
        repos: Repositories,
        jwt: JwtService,
        passwords: PasswordService,
        allow_admin_registration: bool,
    ) -> Self {
        Self {
            repos,
            jwt,
            passwords,
            allow_admin_registration,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthPayload> {
        let input = input.normalized();
        let role = input.role.unwrap_or(Role::Student);

        let mut violations = violations_of(&input);
        if role == Role::Admin && !self.allow_admin_registration {
            violations.push(FieldViolation::new("role", "admin registration is disabled"));
        }
        ensure_valid(violations)?;

        if self.repos.users().get_by_email(&input.email).await?.is_some() {
            return Err(AppError::DuplicateEntry(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = self.passwords.hash_password(&input.password)?;
        let row = self
            .repos
            .users()
            .create(CreateUser {
                email: input.email,
                password_hash,
                name: input.name,
                role: role.into(),
            })
            .await?;

        tracing::info!(user_id = %row.id, role = %row.role, "registered user");
        let token = self.jwt.create_token(row.id, row.email.clone(), row.role)?;
        Ok(AuthPayload {
            token,
            user: row.into(),
        })
    }

    pub async fn login(&self, input: LoginInput) -> AppResult<AuthPayload> {
        let input = input.normalized();
        validate(&input)?;

        let row = self
            .repos
            .users()
            .get_by_email(&input.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !self.passwords.verify_password(&input.password, &row.password_hash)? {
            tracing::debug!(user_id = %row.id, "rejected login");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.jwt.create_token(row.id, row.email.clone(), row.role)?;
        Ok(AuthPayload {
            token,
            user: row.into(),
        })
    }

    /// The profile behind a verified token. A token for a user that no
    /// longer exists yields `None`.
    pub async fn me(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.repos.users().get_by_id(user_id).await?.map(User::from))
    }

    /// Create a user directly, bypassing the admin-registration switch.
    pub(crate) async fn ensure_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: models::Role,
    ) -> AppResult<models::UserRow> {
        if let Some(existing) = self.repos.users().get_by_email(email).await? {
            return Ok(existing);
        }
        let password_hash = self.passwords.hash_password(password)?;
        let row = self
            .repos
            .users()
            .create(CreateUser {
                email: email.to_string(),
                password_hash,
                name: name.to_string(),
                role,
            })
            .await?;
        Ok(row)
    }
}
