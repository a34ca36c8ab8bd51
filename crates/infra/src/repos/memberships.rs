use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_enum, JoinOutcome, MembershipRepository};
use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::MembershipRow;

const MEMBERSHIP_COLUMNS: &str =
    "id, user_id, club_id, joined_at, status, created_at, updated_at";

impl<'r> FromRow<'r, PgRow> for MembershipRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            club_id: row.try_get("club_id")?,
            joined_at: row.try_get("joined_at")?,
            status: decode_enum(row, "status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

pub struct MembershipRepo {
    pool: Db,
}

impl MembershipRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for MembershipRepo {
    async fn join(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<JoinOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the club: joins for the same club run one at a time,
        // so the count below cannot go stale before the write.
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM clubs WHERE id = $1 FOR UPDATE")
                .bind(club_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(capacity) = capacity else {
            return Ok(JoinOutcome::ClubNotFound);
        };

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Ok(JoinOutcome::UserNotFound);
        }

        let existing = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE user_id = $1 AND club_id = $2"
        ))
        .bind(user_id)
        .bind(club_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.as_ref().is_some_and(MembershipRow::is_active) {
            return Ok(JoinOutcome::AlreadyActive);
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE club_id = $1 AND status = 'ACTIVE'",
        )
        .bind(club_id)
        .fetch_one(&mut *tx)
        .await?;

        if active >= i64::from(capacity) {
            tracing::debug!(%club_id, active, capacity, "join rejected, club full");
            return Ok(JoinOutcome::AtCapacity { capacity });
        }

        let outcome = match existing {
            Some(inactive) => {
                let row = sqlx::query_as::<_, MembershipRow>(&format!(
                    r#"
                    UPDATE memberships
                    SET status = 'ACTIVE', joined_at = NOW(), updated_at = NOW()
                    WHERE id = $1
                    RETURNING {MEMBERSHIP_COLUMNS}
                    "#
                ))
                .bind(inactive.id)
                .fetch_one(&mut *tx)
                .await?;
                JoinOutcome::Reactivated(row)
            }
            None => {
                let row = sqlx::query_as::<_, MembershipRow>(&format!(
                    r#"
                    INSERT INTO memberships (id, user_id, club_id, status)
                    VALUES ($1, $2, $3, 'ACTIVE')
                    RETURNING {MEMBERSHIP_COLUMNS}
                    "#
                ))
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(club_id)
                .fetch_one(&mut *tx)
                .await;
                match row {
                    Ok(row) => JoinOutcome::Created(row),
                    // The user row went away between the check and the insert.
                    Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                        return Ok(JoinOutcome::UserNotFound);
                    }
                    Err(e) => return Err(StoreError::from_insert(e, "Membership")),
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn leave(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<Option<MembershipRow>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            UPDATE memberships
            SET status = 'INACTIVE', updated_at = NOW()
            WHERE user_id = $1 AND club_id = $2 AND status = 'ACTIVE'
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_active(&self, club_id: Option<Uuid>) -> StoreResult<Vec<MembershipRow>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM memberships
            WHERE status = 'ACTIVE'
              AND ($1::uuid IS NULL OR club_id = $1)
            ORDER BY joined_at ASC
            "#
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM memberships
            WHERE user_id = $1 AND status = 'ACTIVE'
            ORDER BY joined_at ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_active(&self, club_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE club_id = $1 AND status = 'ACTIVE'",
        )
        .bind(club_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_by_club(&self, club_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memberships WHERE club_id = $1")
            .bind(club_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
