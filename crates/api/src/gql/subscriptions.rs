use async_graphql::{Context, ErrorExtensions, Result, Subscription, ID};
use futures_util::Stream;
use tokio_stream::StreamExt;

use crate::gql::types::{parse_id, Event, Membership};
use crate::services::{Channel, Notification};
use crate::state::AppState;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Joins and leaves, for one club or for all of them.
    async fn club_membership_changed(
        &self,
        ctx: &Context<'_>,
        club_id: Option<ID>,
    ) -> Result<impl Stream<Item = Membership>> {
        let state = ctx.data::<AppState>()?;
        let club_id = club_id
            .map(|id| parse_id(&id, "Club"))
            .transpose()
            .map_err(|e| e.extend())?;
        Ok(state
            .notifications()
            .subscribe(Channel::ClubMembershipChanged, move |n| {
                club_id.map_or(true, |id| n.club_id() == id)
            })
            .filter_map(|n| match n {
                Notification::MembershipChanged(membership) => Some(membership),
                _ => None,
            }))
    }

    async fn event_created(
        &self,
        ctx: &Context<'_>,
        club_id: Option<ID>,
    ) -> Result<impl Stream<Item = Event>> {
        let state = ctx.data::<AppState>()?;
        let club_id = club_id
            .map(|id| parse_id(&id, "Club"))
            .transpose()
            .map_err(|e| e.extend())?;
        Ok(state
            .notifications()
            .subscribe(Channel::EventCreated, move |n| {
                club_id.map_or(true, |id| n.club_id() == id)
            })
            .filter_map(|n| match n {
                Notification::EventCreated(event) => Some(event),
                _ => None,
            }))
    }

    async fn event_updated(
        &self,
        ctx: &Context<'_>,
        event_id: ID,
    ) -> Result<impl Stream<Item = Event>> {
        let state = ctx.data::<AppState>()?;
        let event_id = parse_id(&event_id, "Event").map_err(|e| e.extend())?;
        Ok(state
            .notifications()
            .subscribe(Channel::EventUpdated, move |n| n.event_id() == Some(event_id))
            .filter_map(|n| match n {
                Notification::EventUpdated(event) => Some(event),
                _ => None,
            }))
    }

    /// Yields the id of the removed event.
    async fn event_deleted(
        &self,
        ctx: &Context<'_>,
        event_id: ID,
    ) -> Result<impl Stream<Item = ID>> {
        let state = ctx.data::<AppState>()?;
        let event_id = parse_id(&event_id, "Event").map_err(|e| e.extend())?;
        Ok(state
            .notifications()
            .subscribe(Channel::EventDeleted, move |n| n.event_id() == Some(event_id))
            .filter_map(|n| match n {
                Notification::EventDeleted { event_id, .. } => Some(ID::from(event_id)),
                _ => None,
            }))
    }
}
