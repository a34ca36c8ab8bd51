use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_enum, EventRepository};
use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::{CreateEvent, EventRow, UpdateEvent};
use crate::pagination::LimitOffset;

const EVENT_COLUMNS: &str = "id, club_id, title, description, date, location, time, dress_code, \
                             created_at, updated_at";

impl<'r> FromRow<'r, PgRow> for EventRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            club_id: row.try_get("club_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            location: row.try_get("location")?,
            time: row.try_get("time")?,
            dress_code: decode_enum(row, "dress_code")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Clone)]
pub struct EventRepo {
    pool: Db,
}

impl EventRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for EventRepo {
    async fn create(&self, input: CreateEvent) -> StoreResult<EventRow> {
        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, club_id, title, description, date, location, time, dress_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.club_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.date)
        .bind(&input.location)
        .bind(&input.time)
        .bind(input.dress_code.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::not_found("club")
            }
            _ => StoreError::Db(e),
        })
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, page: LimitOffset) -> StoreResult<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            ORDER BY date ASC, id ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_by_club(&self, club_id: Uuid) -> StoreResult<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE club_id = $1
            ORDER BY date ASC, id ASC
            "#
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: UpdateEvent) -> StoreResult<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                date = COALESCE($4, date),
                location = COALESCE($5, location),
                time = COALESCE($6, time),
                dress_code = COALESCE($7, dress_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.date)
        .bind(changes.location)
        .bind(changes.time)
        .bind(changes.dress_code.map(|d| d.to_string()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "DELETE FROM events WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
