use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::Identity;
use crate::state::AppState;

pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Resolve the bearer token into an `Identity` and attach it to the
    /// request. Never rejects: anonymous callers continue, and resolvers
    /// decide what needs authentication.
    pub async fn resolve_identity(
        State(state): State<AppState>,
        mut request: Request,
        next: Next,
    ) -> Response {
        let identity = state.jwt_service().identify(
            request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|header| header.to_str().ok()),
        );

        if let Identity::User(user) = &identity {
            tracing::debug!(user_id = %user.id, role = %user.role, "authenticated request");
        }

        request.extensions_mut().insert(identity);
        next.run(request).await
    }
}
