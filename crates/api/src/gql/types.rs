use async_graphql::{
    ComplexObject, Context, Enum, ErrorExtensions, InputObject, Result, SimpleObject, ID,
};
use chrono::{DateTime, Utc};
use garde::Validate;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use infra::models;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "UserRole")]
pub enum Role {
    Student,
    Admin,
}

impl From<models::Role> for Role {
    fn from(value: models::Role) -> Self {
        match value {
            models::Role::Student => Self::Student,
            models::Role::Admin => Self::Admin,
        }
    }
}

impl From<Role> for models::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::Student => Self::Student,
            Role::Admin => Self::Admin,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClubCategory {
    Sports,
    Arts,
    Science,
    Music,
    Academic,
    Other,
}

impl From<models::ClubCategory> for ClubCategory {
    fn from(value: models::ClubCategory) -> Self {
        match value {
            models::ClubCategory::Sports => Self::Sports,
            models::ClubCategory::Arts => Self::Arts,
            models::ClubCategory::Science => Self::Science,
            models::ClubCategory::Music => Self::Music,
            models::ClubCategory::Academic => Self::Academic,
            models::ClubCategory::Other => Self::Other,
        }
    }
}

impl From<ClubCategory> for models::ClubCategory {
    fn from(value: ClubCategory) -> Self {
        match value {
            ClubCategory::Sports => Self::Sports,
            ClubCategory::Arts => Self::Arts,
            ClubCategory::Science => Self::Science,
            ClubCategory::Music => Self::Music,
            ClubCategory::Academic => Self::Academic,
            ClubCategory::Other => Self::Other,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum DressCode {
    Casual,
    SmartCasual,
    Formal,
    Uniform,
    Sports,
}

impl From<models::DressCode> for DressCode {
    fn from(value: models::DressCode) -> Self {
        match value {
            models::DressCode::Casual => Self::Casual,
            models::DressCode::SmartCasual => Self::SmartCasual,
            models::DressCode::Formal => Self::Formal,
            models::DressCode::Uniform => Self::Uniform,
            models::DressCode::Sports => Self::Sports,
        }
    }
}

impl From<DressCode> for models::DressCode {
    fn from(value: DressCode) -> Self {
        match value {
            DressCode::Casual => Self::Casual,
            DressCode::SmartCasual => Self::SmartCasual,
            DressCode::Formal => Self::Formal,
            DressCode::Uniform => Self::Uniform,
            DressCode::Sports => Self::Sports,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum MembershipStatus {
    Active,
    Inactive,
}

impl From<models::MembershipStatus> for MembershipStatus {
    fn from(value: models::MembershipStatus) -> Self {
        match value {
            models::MembershipStatus::Active => Self::Active,
            models::MembershipStatus::Inactive => Self::Inactive,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    #[graphql(skip)]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::UserRow> for User {
    fn from(row: models::UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl User {
    async fn id(&self) -> ID {
        self.id.into()
    }
}

/// A club with its creator and ACTIVE member count already fetched.
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Club {
    #[graphql(skip)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: ClubCategory,
    pub capacity: i32,
    pub created_by: User,
    pub member_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Club {
    async fn id(&self) -> ID {
        self.id.into()
    }

    /// ACTIVE memberships of this club.
    async fn members(&self, ctx: &Context<'_>) -> Result<Vec<Membership>> {
        let state = ctx.data::<AppState>()?;
        state
            .hydrator()
            .members_of(self)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Event {
    #[graphql(skip)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub time: String,
    pub dress_code: DressCode,
    pub club: Club,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Event {
    async fn id(&self) -> ID {
        self.id.into()
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Membership {
    #[graphql(skip)]
    pub id: Uuid,
    pub user: User,
    pub club: Club,
    pub joined_at: DateTime<Utc>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Membership {
    async fn id(&self) -> ID {
        self.id.into()
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(InputObject, Validate, Debug)]
pub struct RegisterInput {
    #[garde(email)]
    pub email: String,
    #[garde(length(chars, min = 6))]
    pub password: String,
    #[garde(length(chars, min = 2, max = 50))]
    pub name: String,
    #[garde(skip)]
    pub role: Option<Role>,
}

impl RegisterInput {
    pub(crate) fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            name: self.name.trim().to_string(),
            ..self
        }
    }
}

#[derive(InputObject, Validate, Debug)]
pub struct LoginInput {
    #[garde(email)]
    pub email: String,
    #[garde(length(chars, min = 1))]
    pub password: String,
}

impl LoginInput {
    pub(crate) fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            ..self
        }
    }
}

#[derive(InputObject, Validate, Debug)]
pub struct CreateClubInput {
    #[garde(length(chars, min = 3, max = 100))]
    pub name: String,
    #[garde(length(chars, min = 10, max = 1000))]
    pub description: String,
    #[garde(skip)]
    pub category: ClubCategory,
    #[garde(range(min = 1, max = 500))]
    pub capacity: i32,
}

impl CreateClubInput {
    pub(crate) fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

#[derive(InputObject, Validate, Debug, Default)]
pub struct UpdateClubInput {
    #[garde(length(chars, min = 3, max = 100))]
    pub name: Option<String>,
    #[garde(length(chars, min = 10, max = 1000))]
    pub description: Option<String>,
    #[garde(skip)]
    pub category: Option<ClubCategory>,
    #[garde(range(min = 1, max = 500))]
    pub capacity: Option<i32>,
}

impl UpdateClubInput {
    pub(crate) fn normalized(self) -> Self {
        Self {
            name: trim_opt(self.name),
            description: trim_opt(self.description),
            ..self
        }
    }
}

impl From<UpdateClubInput> for models::UpdateClub {
    fn from(input: UpdateClubInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            category: input.category.map(Into::into),
            capacity: input.capacity,
        }
    }
}

#[derive(InputObject, Validate, Debug)]
pub struct CreateEventInput {
    #[garde(length(chars, min = 3, max = 200))]
    pub title: String,
    #[garde(length(chars, min = 10, max = 2000))]
    pub description: String,
    /// Must not be in the past.
    #[garde(skip)]
    pub date: DateTime<Utc>,
    #[garde(length(chars, min = 3, max = 200))]
    pub location: String,
    /// `HH:MM`, 24-hour clock.
    #[garde(pattern(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$"))]
    pub time: String,
    #[garde(skip)]
    pub dress_code: DressCode,
    #[garde(skip)]
    pub club_id: ID,
}

impl CreateEventInput {
    pub(crate) fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            time: self.time.trim().to_string(),
            ..self
        }
    }
}

#[derive(InputObject, Validate, Debug, Default)]
pub struct UpdateEventInput {
    #[garde(length(chars, min = 3, max = 200))]
    pub title: Option<String>,
    #[garde(length(chars, min = 10, max = 2000))]
    pub description: Option<String>,
    #[garde(skip)]
    pub date: Option<DateTime<Utc>>,
    #[garde(length(chars, min = 3, max = 200))]
    pub location: Option<String>,
    #[garde(pattern(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$"))]
    pub time: Option<String>,
    #[garde(skip)]
    pub dress_code: Option<DressCode>,
}

impl UpdateEventInput {
    pub(crate) fn normalized(self) -> Self {
        Self {
            title: trim_opt(self.title),
            description: trim_opt(self.description),
            location: trim_opt(self.location),
            time: trim_opt(self.time),
            ..self
        }
    }
}

impl From<UpdateEventInput> for models::UpdateEvent {
    fn from(input: UpdateEventInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
            time: input.time,
            dress_code: input.dress_code.map(Into::into),
        }
    }
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string())
}

/// Parse a GraphQL ID into a record id. A malformed id cannot name an
/// existing record, so it is reported as not found.
pub fn parse_id(id: &ID, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.as_str()).map_err(|_| AppError::NotFound(format!("{entity} not found")))
}
