//! In-process store implementing every repository trait.
//!
//! All tables sit behind one lock, so each trait method is atomic with
//! respect to the others. Used when no `DATABASE_URL` is configured and by
//! the test suites.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    ClubRow, CreateClub, CreateEvent, CreateUser, EventRow, MembershipRow, MembershipStatus,
    UpdateClub, UpdateEvent, UserRow,
};
use crate::pagination::LimitOffset;
use crate::repos::{
    ClubRepository, DeletedClub, EventRepository, HealthCheckRepository, JoinOutcome,
    MembershipRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRow>,
    clubs: HashMap<Uuid, ClubRow>,
    events: HashMap<Uuid, EventRow>,
    memberships: HashMap<Uuid, MembershipRow>,
}

impl Tables {
    fn membership_for(&self, user_id: Uuid, club_id: Uuid) -> Option<&MembershipRow> {
        self.memberships
            .values()
            .find(|m| m.user_id == user_id && m.club_id == club_id)
    }

    fn active_count(&self, club_id: Uuid) -> i64 {
        self.memberships
            .values()
            .filter(|m| m.club_id == club_id && m.is_active())
            .count() as i64
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_joined(mut rows: Vec<MembershipRow>) -> Vec<MembershipRow> {
    rows.sort_by_key(|m| (m.joined_at, m.id));
    rows
}

#[async_trait]
impl HealthCheckRepository for MemoryStore {
    async fn check_connection(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, input: CreateUser) -> StoreResult<UserRow> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Duplicate(
                "User with this email already exists".into(),
            ));
        }

        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash: input.password_hash,
            name: input.name,
            role: input.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<UserRow>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl ClubRepository for MemoryStore {
    async fn create(&self, input: CreateClub) -> StoreResult<ClubRow> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&input.created_by) {
            return Err(StoreError::not_found("user"));
        }

        let now = Utc::now();
        let row = ClubRow {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            category: input.category,
            capacity: input.capacity,
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.clubs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ClubRow>> {
        Ok(self.tables.read().await.clubs.get(&id).cloned())
    }

    async fn list(&self, page: LimitOffset) -> StoreResult<Vec<ClubRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<ClubRow> = tables.clubs.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(rows))
    }

    async fn update(&self, id: Uuid, changes: UpdateClub) -> StoreResult<Option<ClubRow>> {
        let mut tables = self.tables.write().await;
        let active = tables.active_count(id);
        let Some(club) = tables.clubs.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(capacity) = changes.capacity {
            if i64::from(capacity) < active {
                return Err(StoreError::CapacityBelowMembers { capacity, active });
            }
            club.capacity = capacity;
        }
        if let Some(name) = changes.name {
            club.name = name;
        }
        if let Some(description) = changes.description {
            club.description = description;
        }
        if let Some(category) = changes.category {
            club.category = category;
        }
        club.updated_at = Utc::now();
        Ok(Some(club.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<DeletedClub>> {
        let mut tables = self.tables.write().await;
        let Some(club) = tables.clubs.remove(&id) else {
            return Ok(None);
        };

        let before = tables.memberships.len();
        tables.memberships.retain(|_, m| m.club_id != id);
        let memberships_removed = (before - tables.memberships.len()) as u64;

        let event_ids: Vec<Uuid> = tables
            .events
            .values()
            .filter(|e| e.club_id == id)
            .map(|e| e.id)
            .collect();
        for event_id in &event_ids {
            tables.events.remove(event_id);
        }

        Ok(Some(DeletedClub {
            club,
            event_ids,
            memberships_removed,
        }))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, input: CreateEvent) -> StoreResult<EventRow> {
        let mut tables = self.tables.write().await;
        if !tables.clubs.contains_key(&input.club_id) {
            return Err(StoreError::not_found("club"));
        }

        let now = Utc::now();
        let row = EventRow {
            id: Uuid::new_v4(),
            club_id: input.club_id,
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
            time: input.time,
            dress_code: input.dress_code,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<EventRow>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn list(&self, page: LimitOffset) -> StoreResult<Vec<EventRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<EventRow> = tables.events.values().cloned().collect();
        rows.sort_by_key(|e| (e.date, e.id));
        Ok(page.apply(rows))
    }

    async fn list_by_club(&self, club_id: Uuid) -> StoreResult<Vec<EventRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<EventRow> = tables
            .events
            .values()
            .filter(|e| e.club_id == club_id)
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.date, e.id));
        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: UpdateEvent) -> StoreResult<Option<EventRow>> {
        let mut tables = self.tables.write().await;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            event.title = title;
        }
        if let Some(description) = changes.description {
            event.description = description;
        }
        if let Some(date) = changes.date {
            event.date = date;
        }
        if let Some(location) = changes.location {
            event.location = location;
        }
        if let Some(time) = changes.time {
            event.time = time;
        }
        if let Some(dress_code) = changes.dress_code {
            event.dress_code = dress_code;
        }
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<EventRow>> {
        Ok(self.tables.write().await.events.remove(&id))
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn join(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<JoinOutcome> {
        let mut tables = self.tables.write().await;
        let Some(capacity) = tables.clubs.get(&club_id).map(|c| c.capacity) else {
            return Ok(JoinOutcome::ClubNotFound);
        };
        if !tables.users.contains_key(&user_id) {
            return Ok(JoinOutcome::UserNotFound);
        }

        let existing = tables.membership_for(user_id, club_id).cloned();
        if existing.as_ref().is_some_and(MembershipRow::is_active) {
            return Ok(JoinOutcome::AlreadyActive);
        }
        if tables.active_count(club_id) >= i64::from(capacity) {
            return Ok(JoinOutcome::AtCapacity { capacity });
        }

        let now = Utc::now();
        match existing {
            Some(mut row) => {
                row.status = MembershipStatus::Active;
                row.joined_at = now;
                row.updated_at = now;
                tables.memberships.insert(row.id, row.clone());
                Ok(JoinOutcome::Reactivated(row))
            }
            None => {
                let row = MembershipRow {
                    id: Uuid::new_v4(),
                    user_id,
                    club_id,
                    joined_at: now,
                    status: MembershipStatus::Active,
                    created_at: now,
                    updated_at: now,
                };
                tables.memberships.insert(row.id, row.clone());
                Ok(JoinOutcome::Created(row))
            }
        }
    }

    async fn leave(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<Option<MembershipRow>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .memberships
            .values_mut()
            .find(|m| m.user_id == user_id && m.club_id == club_id && m.is_active())
        else {
            return Ok(None);
        };

        row.status = MembershipStatus::Inactive;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn list_active(&self, club_id: Option<Uuid>) -> StoreResult<Vec<MembershipRow>> {
        let tables = self.tables.read().await;
        let rows = tables
            .memberships
            .values()
            .filter(|m| m.is_active() && club_id.map_or(true, |id| m.club_id == id))
            .cloned()
            .collect();
        Ok(sorted_by_joined(rows))
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>> {
        let tables = self.tables.read().await;
        let rows = tables
            .memberships
            .values()
            .filter(|m| m.is_active() && m.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_joined(rows))
    }

    async fn count_active(&self, club_id: Uuid) -> StoreResult<i64> {
        Ok(self.tables.read().await.active_count(club_id))
    }

    async fn count_by_club(&self, club_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.club_id == club_id)
            .count() as i64)
    }
}
