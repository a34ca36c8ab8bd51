//! Turns stored rows into the nested GraphQL values.
//!
//! Lists cache users and clubs by id so a page of memberships for one club
//! loads that club once.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gql::types::{Club, Event, Membership, User};
use infra::models::{ClubRow, EventRow, MembershipRow};
use infra::Repositories;

#[derive(Clone)]
pub struct Hydrator {
    repos: Repositories,
}

impl Hydrator {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn user(&self, id: Uuid) -> AppResult<User> {
        self.repos
            .users()
            .get_by_id(id)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn club(&self, row: ClubRow) -> AppResult<Club> {
        let created_by = self.user(row.created_by).await?;
        let member_count = self.repos.memberships().count_active(row.id).await?;
        Ok(Club {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category.into(),
            capacity: row.capacity,
            created_by,
            member_count: i32::try_from(member_count).unwrap_or(i32::MAX),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub async fn club_by_id(&self, id: Uuid) -> AppResult<Club> {
        let row = self
            .repos
            .clubs()
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;
        self.club(row).await
    }

    pub async fn clubs(&self, rows: Vec<ClubRow>) -> AppResult<Vec<Club>> {
        let mut clubs = Vec::with_capacity(rows.len());
        for row in rows {
            clubs.push(self.club(row).await?);
        }
        Ok(clubs)
    }

    pub async fn event(&self, row: EventRow) -> AppResult<Event> {
        let club = self.club_by_id(row.club_id).await?;
        Ok(event_with_club(row, club))
    }

    pub async fn events(&self, rows: Vec<EventRow>) -> AppResult<Vec<Event>> {
        let mut clubs: HashMap<Uuid, Club> = HashMap::new();
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let club = match clubs.get(&row.club_id) {
                Some(club) => club.clone(),
                None => {
                    let club = self.club_by_id(row.club_id).await?;
                    clubs.insert(row.club_id, club.clone());
                    club
                }
            };
            events.push(event_with_club(row, club));
        }
        Ok(events)
    }

    pub async fn membership(&self, row: MembershipRow) -> AppResult<Membership> {
        let user = self.user(row.user_id).await?;
        let club = self.club_by_id(row.club_id).await?;
        Ok(membership_with(row, user, club))
    }

    pub async fn memberships(&self, rows: Vec<MembershipRow>) -> AppResult<Vec<Membership>> {
        let mut users: HashMap<Uuid, User> = HashMap::new();
        let mut clubs: HashMap<Uuid, Club> = HashMap::new();
        let mut memberships = Vec::with_capacity(rows.len());
        for row in rows {
            let user = match users.get(&row.user_id) {
                Some(user) => user.clone(),
                None => {
                    let user = self.user(row.user_id).await?;
                    users.insert(row.user_id, user.clone());
                    user
                }
            };
            let club = match clubs.get(&row.club_id) {
                Some(club) => club.clone(),
                None => {
                    let club = self.club_by_id(row.club_id).await?;
                    clubs.insert(row.club_id, club.clone());
                    club
                }
            };
            memberships.push(membership_with(row, user, club));
        }
        Ok(memberships)
    }

    /// ACTIVE memberships of an already hydrated club.
    pub async fn members_of(&self, club: &Club) -> AppResult<Vec<Membership>> {
        let rows = self.repos.memberships().list_active(Some(club.id)).await?;
        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            let user = self.user(row.user_id).await?;
            members.push(membership_with(row, user, club.clone()));
        }
        Ok(members)
    }
}

pub(crate) fn event_with_club(row: EventRow, club: Club) -> Event {
    Event {
        id: row.id,
        title: row.title,
        description: row.description,
        date: row.date,
        location: row.location,
        time: row.time,
        dress_code: row.dress_code.into(),
        club,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn membership_with(row: MembershipRow, user: User, club: Club) -> Membership {
    Membership {
        id: row.id,
        user,
        club,
        joined_at: row.joined_at,
        status: row.status.into(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
