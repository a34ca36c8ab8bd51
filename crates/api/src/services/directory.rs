use chrono::Utc;
use uuid::Uuid;

use crate::auth::Admin;
use crate::error::{AppError, AppResult, FieldViolation};
use crate::gql::types::{
    parse_id, Club, CreateClubInput, CreateEventInput, Event, UpdateClubInput, UpdateEventInput,
};
use crate::services::hydrate::{event_with_club, Hydrator};
use crate::services::notifications::{Notification, NotificationBus};
use crate::services::validation::{ensure_valid, validate, violations_of};
use infra::models::{CreateClub, CreateEvent};
use infra::pagination::LimitOffset;
use infra::Repositories;

/// Club and event catalogue. Reads are open to everyone; every write takes an
/// [`Admin`] proof.
#[derive(Clone)]
pub struct DirectoryService {
    repos: Repositories,
    hydrator: Hydrator,
    bus: NotificationBus,
}

impl DirectoryService {
    pub fn new(repos: Repositories, hydrator: Hydrator, bus: NotificationBus) -> Self {
        Self {
            repos,
            hydrator,
            bus,
        }
    }

    pub async fn clubs(&self, page: LimitOffset) -> AppResult<Vec<Club>> {
        let rows = self.repos.clubs().list(page).await?;
        self.hydrator.clubs(rows).await
    }

    pub async fn club(&self, id: Uuid) -> AppResult<Club> {
        self.hydrator.club_by_id(id).await
    }

    pub async fn create_club(&self, admin: &Admin, input: CreateClubInput) -> AppResult<Club> {
        let input = input.normalized();
        validate(&input)?;

        let row = self
            .repos
            .clubs()
            .create(CreateClub {
                name: input.name,
                description: input.description,
                category: input.category.into(),
                capacity: input.capacity,
                created_by: admin.id(),
            })
            .await?;

        tracing::info!(club_id = %row.id, admin_id = %admin.id(), "created club");
        self.hydrator.club(row).await
    }

    pub async fn update_club(
        &self,
        admin: &Admin,
        id: Uuid,
        input: UpdateClubInput,
    ) -> AppResult<Club> {
        let input = input.normalized();
        validate(&input)?;

        let row = self
            .repos
            .clubs()
            .update(id, input.into())
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;

        tracing::info!(club_id = %row.id, admin_id = %admin.id(), "updated club");
        self.hydrator.club(row).await
    }

    /// Removes the club with its memberships and events. Subscribers of the
    /// removed events are told about each one.
    pub async fn delete_club(&self, admin: &Admin, id: Uuid) -> AppResult<bool> {
        let deleted = self
            .repos
            .clubs()
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;

        tracing::info!(
            club_id = %id,
            admin_id = %admin.id(),
            events = deleted.event_ids.len(),
            memberships = deleted.memberships_removed,
            "deleted club"
        );
        for event_id in deleted.event_ids {
            self.bus.publish(Notification::EventDeleted {
                event_id,
                club_id: deleted.club.id,
            });
        }
        Ok(true)
    }

    pub async fn events(&self, page: LimitOffset) -> AppResult<Vec<Event>> {
        let rows = self.repos.events().list(page).await?;
        self.hydrator.events(rows).await
    }

    pub async fn event(&self, id: Uuid) -> AppResult<Event> {
        let row = self
            .repos
            .events()
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        self.hydrator.event(row).await
    }

    pub async fn events_by_club(&self, club_id: Uuid) -> AppResult<Vec<Event>> {
        let club = self.hydrator.club_by_id(club_id).await?;
        let rows = self.repos.events().list_by_club(club_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| event_with_club(row, club.clone()))
            .collect())
    }

    pub async fn create_event(&self, admin: &Admin, input: CreateEventInput) -> AppResult<Event> {
        let input = input.normalized();
        let mut violations = violations_of(&input);
        if input.date < Utc::now() {
            violations.push(FieldViolation::new("date", "event date cannot be in the past"));
        }
        ensure_valid(violations)?;

        let club_id = parse_id(&input.club_id, "Club")?;
        let row = self
            .repos
            .events()
            .create(CreateEvent {
                club_id,
                title: input.title,
                description: input.description,
                date: input.date,
                location: input.location,
                time: input.time,
                dress_code: input.dress_code.into(),
            })
            .await?;

        tracing::info!(event_id = %row.id, %club_id, admin_id = %admin.id(), "created event");
        let event = self.hydrator.event(row).await?;
        self.bus.publish(Notification::EventCreated(event.clone()));
        Ok(event)
    }

    pub async fn update_event(
        &self,
        admin: &Admin,
        id: Uuid,
        input: UpdateEventInput,
    ) -> AppResult<Event> {
        let input = input.normalized();
        validate(&input)?;

        let row = self
            .repos
            .events()
            .update(id, input.into())
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        tracing::info!(event_id = %row.id, admin_id = %admin.id(), "updated event");
        let event = self.hydrator.event(row).await?;
        self.bus.publish(Notification::EventUpdated(event.clone()));
        Ok(event)
    }

    pub async fn delete_event(&self, admin: &Admin, id: Uuid) -> AppResult<bool> {
        let row = self
            .repos
            .events()
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        tracing::info!(event_id = %row.id, admin_id = %admin.id(), "deleted event");
        self.bus.publish(Notification::EventDeleted {
            event_id: row.id,
            club_id: row.club_id,
        });
        Ok(true)
    }
}
