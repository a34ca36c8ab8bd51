pub mod accounts;
pub mod directory;
pub mod hydrate;
pub mod memberships;
pub mod notifications;
pub mod seed;
pub mod validation;

pub use accounts::AccountService;
pub use directory::DirectoryService;
pub use hydrate::Hydrator;
pub use memberships::MembershipService;
pub use notifications::{Channel, Notification, NotificationBus};
