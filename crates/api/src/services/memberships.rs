use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::gql::types::{Club, Membership};
use crate::services::hydrate::Hydrator;
use crate::services::notifications::{Notification, NotificationBus};
use infra::repos::JoinOutcome;
use infra::Repositories;

/// Joining and leaving clubs. Every change is announced on
/// `CLUB_MEMBERSHIP_CHANGED` after it is stored.
#[derive(Clone)]
pub struct MembershipService {
    repos: Repositories,
    hydrator: Hydrator,
    bus: NotificationBus,
}

impl MembershipService {
    pub fn new(repos: Repositories, hydrator: Hydrator, bus: NotificationBus) -> Self {
        Self {
            repos,
            hydrator,
            bus,
        }
    }

    pub async fn join(&self, user: &AuthUser, club_id: Uuid) -> AppResult<Membership> {
        let row = match self.repos.memberships().join(user.id, club_id).await? {
            JoinOutcome::Created(row) | JoinOutcome::Reactivated(row) => row,
            JoinOutcome::AlreadyActive => {
                return Err(AppError::DuplicateEntry(
                    "Already a member of this club".to_string(),
                ))
            }
            JoinOutcome::AtCapacity { capacity } => {
                tracing::debug!(%club_id, capacity, user_id = %user.id, "club is full");
                return Err(AppError::invalid("Club is at full capacity"));
            }
            JoinOutcome::ClubNotFound => {
                return Err(AppError::NotFound("Club not found".to_string()))
            }
            JoinOutcome::UserNotFound => {
                tracing::warn!(user_id = %user.id, "join with a token for a missing user");
                return Err(AppError::Unauthorized(
                    "User account no longer exists".to_string(),
                ));
            }
        };

        tracing::info!(%club_id, user_id = %user.id, membership_id = %row.id, "joined club");
        let membership = self.hydrator.membership(row).await?;
        self.bus
            .publish(Notification::MembershipChanged(membership.clone()));
        Ok(membership)
    }

    pub async fn leave(&self, user: &AuthUser, club_id: Uuid) -> AppResult<bool> {
        let row = self
            .repos
            .memberships()
            .leave(user.id, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

        tracing::info!(%club_id, user_id = %user.id, "left club");
        // The club may have been removed in between; the leave itself stands.
        match self.hydrator.membership(row).await {
            Ok(membership) => {
                self.bus.publish(Notification::MembershipChanged(membership));
            }
            Err(e) => tracing::warn!(%club_id, error = %e, "skipped membership notification"),
        }
        Ok(true)
    }

    /// ACTIVE memberships, optionally of a single club.
    pub async fn list(&self, club_id: Option<Uuid>) -> AppResult<Vec<Membership>> {
        let rows = self.repos.memberships().list_active(club_id).await?;
        self.hydrator.memberships(rows).await
    }

    pub async fn mine(&self, user: &AuthUser) -> AppResult<Vec<Membership>> {
        let rows = self.repos.memberships().list_active_by_user(user.id).await?;
        self.hydrator.memberships(rows).await
    }

    pub async fn my_clubs(&self, user: &AuthUser) -> AppResult<Vec<Club>> {
        Ok(self
            .mine(user)
            .await?
            .into_iter()
            .map(|membership| membership.club)
            .collect())
    }
}
