pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use crate::config::AuthConfig;
pub use identity::{Admin, AuthUser, Identity};
pub use jwt::{Claims, JwtService};
pub use password::PasswordService;
