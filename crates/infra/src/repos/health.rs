use async_trait::async_trait;

use super::HealthCheckRepository;
use crate::db::{self, Db};
use crate::error::StoreResult;

pub struct HealthCheckRepo {
    pool: Db,
}

impl HealthCheckRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheckRepository for HealthCheckRepo {
    async fn check_connection(&self) -> StoreResult<()> {
        db::ping(&self.pool).await?;
        Ok(())
    }
}
