use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_enum, ClubRepository, DeletedClub};
use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::{ClubRow, CreateClub, UpdateClub};
use crate::pagination::LimitOffset;

const CLUB_COLUMNS: &str =
    "id, name, description, category, capacity, created_by, created_at, updated_at";

impl<'r> FromRow<'r, PgRow> for ClubRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: decode_enum(row, "category")?,
            capacity: row.try_get("capacity")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Clone)]
pub struct ClubRepo {
    pool: Db,
}

impl ClubRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClubRepository for ClubRepo {
    async fn create(&self, input: CreateClub) -> StoreResult<ClubRow> {
        let row = sqlx::query_as::<_, ClubRow>(&format!(
            r#"
            INSERT INTO clubs (id, name, description, category, capacity, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.as_ref())
        .bind(input.capacity)
        .bind(input.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ClubRow>> {
        let row = sqlx::query_as::<_, ClubRow>(&format!(
            "SELECT {CLUB_COLUMNS} FROM clubs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, page: LimitOffset) -> StoreResult<Vec<ClubRow>> {
        let rows = sqlx::query_as::<_, ClubRow>(&format!(
            r#"
            SELECT {CLUB_COLUMNS}
            FROM clubs
            ORDER BY name ASC, id ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: UpdateClub) -> StoreResult<Option<ClubRow>> {
        let mut tx = self.pool.begin().await?;

        // Same row lock as `MembershipRepo::join`, so a shrink cannot slip
        // between a join's count and its insert.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM clubs WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        if let Some(capacity) = changes.capacity {
            let active: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM memberships WHERE club_id = $1 AND status = 'ACTIVE'",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if i64::from(capacity) < active {
                return Err(StoreError::CapacityBelowMembers { capacity, active });
            }
        }

        let row = sqlx::query_as::<_, ClubRow>(&format!(
            r#"
            UPDATE clubs
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                capacity = COALESCE($5, capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.category.map(|c| c.to_string()))
        .bind(changes.capacity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<DeletedClub>> {
        let mut tx = self.pool.begin().await?;

        let memberships_removed = sqlx::query("DELETE FROM memberships WHERE club_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let event_ids: Vec<Uuid> =
            sqlx::query_scalar("DELETE FROM events WHERE club_id = $1 RETURNING id")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let club = sqlx::query_as::<_, ClubRow>(&format!(
            "DELETE FROM clubs WHERE id = $1 RETURNING {CLUB_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(club) = club else {
            // Nothing to delete; dropping the transaction rolls it back.
            return Ok(None);
        };

        tx.commit().await?;
        Ok(Some(DeletedClub {
            club,
            event_ids,
            memberships_removed,
        }))
    }
}
