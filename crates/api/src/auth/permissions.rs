use async_graphql::Context;

use crate::auth::{Admin, AuthUser, Identity};
use crate::error::AppError;

/// The caller's identity as placed in the request data by the transport
/// layer. Requests without one are anonymous.
pub fn identity(ctx: &Context<'_>) -> Identity {
    ctx.data_opt::<Identity>().cloned().unwrap_or_default()
}

pub fn require_user(ctx: &Context<'_>) -> Result<AuthUser, AppError> {
    identity(ctx).require_user()
}

pub fn require_admin(ctx: &Context<'_>) -> Result<Admin, AppError> {
    identity(ctx).require_admin()
}
