use async_graphql::{Context, ErrorExtensions, Object, Result, ID};

use crate::auth::permissions::{require_admin, require_user};
use crate::gql::types::{
    parse_id, AuthPayload, Club, CreateClubInput, CreateEventInput, Event, LoginInput,
    Membership, RegisterInput, UpdateClubInput, UpdateEventInput,
};
use crate::state::AppState;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register(&self, ctx: &Context<'_>, input: RegisterInput) -> Result<AuthPayload> {
        let state = ctx.data::<AppState>()?;
        state.accounts().register(input).await.map_err(|e| e.extend())
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let state = ctx.data::<AppState>()?;
        state.accounts().login(input).await.map_err(|e| e.extend())
    }

    async fn create_club(&self, ctx: &Context<'_>, input: CreateClubInput) -> Result<Club> {
        let state = ctx.data::<AppState>()?;
        let admin = require_admin(ctx).map_err(|e| e.extend())?;
        state
            .directory()
            .create_club(&admin, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_club(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateClubInput,
    ) -> Result<Club> {
        let state = ctx.data::<AppState>()?;
        let admin = require_admin(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "Club").map_err(|e| e.extend())?;
        state
            .directory()
            .update_club(&admin, id, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_club(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let admin = require_admin(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "Club").map_err(|e| e.extend())?;
        state
            .directory()
            .delete_club(&admin, id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_event(&self, ctx: &Context<'_>, input: CreateEventInput) -> Result<Event> {
        let state = ctx.data::<AppState>()?;
        let admin = require_admin(ctx).map_err(|e| e.extend())?;
        state
            .directory()
            .create_event(&admin, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_event(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateEventInput,
    ) -> Result<Event> {
        let state = ctx.data::<AppState>()?;
        let admin = require_admin(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "Event").map_err(|e| e.extend())?;
        state
            .directory()
            .update_event(&admin, id, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_event(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let admin = require_admin(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "Event").map_err(|e| e.extend())?;
        state
            .directory()
            .delete_event(&admin, id)
            .await
            .map_err(|e| e.extend())
    }

    async fn join_club(&self, ctx: &Context<'_>, club_id: ID) -> Result<Membership> {
        let state = ctx.data::<AppState>()?;
        let user = require_user(ctx).map_err(|e| e.extend())?;
        let club_id = parse_id(&club_id, "Club").map_err(|e| e.extend())?;
        state
            .memberships()
            .join(&user, club_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn leave_club(&self, ctx: &Context<'_>, club_id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let user = require_user(ctx).map_err(|e| e.extend())?;
        let club_id = parse_id(&club_id, "Club").map_err(|e| e.extend())?;
        state
            .memberships()
            .leave(&user, club_id)
            .await
            .map_err(|e| e.extend())
    }
}
