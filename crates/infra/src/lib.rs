pub mod db;
pub mod error;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod repos;

pub use error::{StoreError, StoreResult};
pub use repos::Repositories;
