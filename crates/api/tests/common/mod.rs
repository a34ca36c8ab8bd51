#![allow(dead_code)]

use api::auth::{AuthConfig, AuthUser, Identity};
use api::gql::{build_schema, AppSchema};
use api::AppState;
use async_graphql::{Request, Variables};
use infra::models::{ClubCategory, CreateClub, CreateUser, Role};
use infra::Repositories;
use serde_json::json;
use uuid::Uuid;

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        bcrypt_cost: 4,
        allow_admin_registration: true,
    }
}

/// Fresh state over an empty in-process store.
pub fn setup_state() -> AppState {
    AppState::new(Repositories::in_memory(), &test_auth_config())
}

pub fn setup() -> (AppState, AppSchema) {
    let state = setup_state();
    let schema = build_schema(state.clone());
    (state, schema)
}

/// Helper function to execute GraphQL queries and mutations
pub async fn execute_graphql(
    schema: &AppSchema,
    query: &str,
    variables: Option<Variables>,
    identity: Option<Identity>,
) -> async_graphql::Response {
    let mut request = Request::new(query);

    if let Some(vars) = variables {
        request = request.variables(vars);
    }

    if let Some(identity) = identity {
        request = request.data(identity);
    }

    schema.execute(request).await
}

/// `extensions.code` of the first error, if any.
pub fn error_code(response: &async_graphql::Response) -> Option<String> {
    let value = serde_json::to_value(response).ok()?;
    value["errors"][0]["extensions"]["code"]
        .as_str()
        .map(str::to_string)
}

/// Create test user directly in the store and return its identity
pub async fn create_test_user(state: &AppState, email: &str, role: Role) -> Identity {
    let row = state
        .repos()
        .users()
        .create(CreateUser {
            email: email.to_string(),
            password_hash: "$2b$04$not.a.real.hash.for.tests".to_string(),
            name: "Test User".to_string(),
            role,
        })
        .await
        .expect("Failed to create test user");

    Identity::User(AuthUser {
        id: row.id,
        email: row.email,
        role: row.role,
    })
}

pub async fn create_admin(state: &AppState) -> Identity {
    create_test_user(state, &format!("admin-{}@school.test", Uuid::new_v4()), Role::Admin).await
}

pub async fn create_student(state: &AppState) -> Identity {
    create_test_user(state, &format!("student-{}@school.test", Uuid::new_v4()), Role::Student).await
}

pub fn user_id(identity: &Identity) -> Uuid {
    identity.user().expect("authenticated identity").id
}

/// Create test club and return its ID
pub async fn create_test_club(state: &AppState, admin: &Identity, name: &str, capacity: i32) -> Uuid {
    state
        .repos()
        .clubs()
        .create(CreateClub {
            name: name.to_string(),
            description: "A club created for tests".to_string(),
            category: ClubCategory::Other,
            capacity,
            created_by: user_id(admin),
        })
        .await
        .expect("Failed to create test club")
        .id
}

pub const JOIN_CLUB: &str = r#"
    mutation Join($clubId: ID!) {
        joinClub(clubId: $clubId) {
            id
            status
            user { id }
            club { id memberCount }
        }
    }
"#;

pub const LEAVE_CLUB: &str = r#"
    mutation Leave($clubId: ID!) {
        leaveClub(clubId: $clubId)
    }
"#;

pub fn club_vars(club_id: Uuid) -> Variables {
    Variables::from_json(json!({ "clubId": club_id.to_string() }))
}
