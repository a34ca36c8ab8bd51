use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::Db;
use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::models::{
    ClubRow, CreateClub, CreateEvent, CreateUser, EventRow, MembershipRow, UpdateClub,
    UpdateEvent, UserRow,
};
use crate::pagination::LimitOffset;

pub mod clubs;
pub mod events;
pub mod health;
pub mod memberships;
pub mod users;

pub use clubs::ClubRepo;
pub use events::EventRepo;
pub use health::HealthCheckRepo;
pub use memberships::MembershipRepo;
pub use users::UserRepo;

/// Result of an atomic join attempt.
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    Created(MembershipRow),
    /// An INACTIVE record for the pair was flipped back to ACTIVE.
    Reactivated(MembershipRow),
    AlreadyActive,
    AtCapacity { capacity: i32 },
    ClubNotFound,
    /// The joining user has no account row.
    UserNotFound,
}

/// What a club deletion removed along with the club itself.
#[derive(Debug, Clone)]
pub struct DeletedClub {
    pub club: ClubRow,
    pub event_ids: Vec<Uuid>,
    pub memberships_removed: u64,
}

#[async_trait]
pub trait HealthCheckRepository: Send + Sync {
    async fn check_connection(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Duplicate` when the email is taken.
    async fn create(&self, input: CreateUser) -> StoreResult<UserRow>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<UserRow>>;
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<UserRow>>;
}

#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn create(&self, input: CreateClub) -> StoreResult<ClubRow>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<ClubRow>>;
    async fn list(&self, page: LimitOffset) -> StoreResult<Vec<ClubRow>>;
    /// Fails with `CapacityBelowMembers` when the new capacity is lower than
    /// the current ACTIVE count.
    async fn update(&self, id: Uuid, changes: UpdateClub) -> StoreResult<Option<ClubRow>>;
    /// Removes the club, its memberships and its events in one unit.
    async fn delete(&self, id: Uuid) -> StoreResult<Option<DeletedClub>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fails with `NotFound` when the club does not exist.
    async fn create(&self, input: CreateEvent) -> StoreResult<EventRow>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<EventRow>>;
    async fn list(&self, page: LimitOffset) -> StoreResult<Vec<EventRow>>;
    async fn list_by_club(&self, club_id: Uuid) -> StoreResult<Vec<EventRow>>;
    async fn update(&self, id: Uuid, changes: UpdateEvent) -> StoreResult<Option<EventRow>>;
    async fn delete(&self, id: Uuid) -> StoreResult<Option<EventRow>>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Capacity check and activation as one atomic step.
    async fn join(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<JoinOutcome>;
    /// Flips an ACTIVE membership to INACTIVE. `None` when there is no ACTIVE one.
    async fn leave(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<Option<MembershipRow>>;
    async fn list_active(&self, club_id: Option<Uuid>) -> StoreResult<Vec<MembershipRow>>;
    async fn list_active_by_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>>;
    async fn count_active(&self, club_id: Uuid) -> StoreResult<i64>;
    /// All records for the club regardless of status.
    async fn count_by_club(&self, club_id: Uuid) -> StoreResult<i64>;
}

/// Handles to every repository, backed by one store.
#[derive(Clone)]
pub struct Repositories {
    health: Arc<dyn HealthCheckRepository>,
    users: Arc<dyn UserRepository>,
    clubs: Arc<dyn ClubRepository>,
    events: Arc<dyn EventRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl Repositories {
    pub fn postgres(pool: Db) -> Self {
        Self {
            health: Arc::new(HealthCheckRepo::new(pool.clone())),
            users: Arc::new(UserRepo::new(pool.clone())),
            clubs: Arc::new(ClubRepo::new(pool.clone())),
            events: Arc::new(EventRepo::new(pool.clone())),
            memberships: Arc::new(MembershipRepo::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            health: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            clubs: Arc::new(store.clone()),
            events: Arc::new(store.clone()),
            memberships: Arc::new(store),
        }
    }

    pub fn health(&self) -> Arc<dyn HealthCheckRepository> {
        self.health.clone()
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    pub fn clubs(&self) -> Arc<dyn ClubRepository> {
        self.clubs.clone()
    }

    pub fn events(&self) -> Arc<dyn EventRepository> {
        self.events.clone()
    }

    pub fn memberships(&self) -> Arc<dyn MembershipRepository> {
        self.memberships.clone()
    }
}

/// Decode a TEXT column into one of the strum-backed enums.
pub(crate) fn decode_enum<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
