use async_graphql::{Context, ErrorExtensions, Object, Result, ID};

use crate::auth::permissions::{identity, require_user};
use crate::gql::types::{parse_id, Club, Event, Membership, User};
use crate::state::AppState;
use infra::pagination::LimitOffset;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Clubs ordered by name.
    async fn clubs(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Club>> {
        let state = ctx.data::<AppState>()?;
        state
            .directory()
            .clubs(LimitOffset::from_args(limit, offset))
            .await
            .map_err(|e| e.extend())
    }

    async fn club(&self, ctx: &Context<'_>, id: ID) -> Result<Club> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "Club").map_err(|e| e.extend())?;
        state.directory().club(id).await.map_err(|e| e.extend())
    }

    /// Clubs the caller is an ACTIVE member of.
    async fn my_clubs(&self, ctx: &Context<'_>) -> Result<Vec<Club>> {
        let state = ctx.data::<AppState>()?;
        let user = require_user(ctx).map_err(|e| e.extend())?;
        state.memberships().my_clubs(&user).await.map_err(|e| e.extend())
    }

    /// Events ordered by date, soonest first.
    async fn events(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Event>> {
        let state = ctx.data::<AppState>()?;
        state
            .directory()
            .events(LimitOffset::from_args(limit, offset))
            .await
            .map_err(|e| e.extend())
    }

    async fn event(&self, ctx: &Context<'_>, id: ID) -> Result<Event> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "Event").map_err(|e| e.extend())?;
        state.directory().event(id).await.map_err(|e| e.extend())
    }

    async fn events_by_club(&self, ctx: &Context<'_>, club_id: ID) -> Result<Vec<Event>> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&club_id, "Club").map_err(|e| e.extend())?;
        state
            .directory()
            .events_by_club(club_id)
            .await
            .map_err(|e| e.extend())
    }

    /// ACTIVE memberships, optionally narrowed to one club.
    async fn memberships(&self, ctx: &Context<'_>, club_id: Option<ID>) -> Result<Vec<Membership>> {
        let state = ctx.data::<AppState>()?;
        let club_id = club_id
            .map(|id| parse_id(&id, "Club"))
            .transpose()
            .map_err(|e| e.extend())?;
        state.memberships().list(club_id).await.map_err(|e| e.extend())
    }

    async fn my_memberships(&self, ctx: &Context<'_>) -> Result<Vec<Membership>> {
        let state = ctx.data::<AppState>()?;
        let user = require_user(ctx).map_err(|e| e.extend())?;
        state.memberships().mine(&user).await.map_err(|e| e.extend())
    }

    /// The authenticated caller, or null for anonymous requests.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let state = ctx.data::<AppState>()?;
        match identity(ctx).user() {
            Some(user) => state.accounts().me(user.id).await.map_err(|e| e.extend()),
            None => Ok(None),
        }
    }
}
