use infra::Repositories;

use crate::auth::{AuthConfig, JwtService, PasswordService};
use crate::services::{AccountService, DirectoryService, Hydrator, MembershipService, NotificationBus};

/// Everything a request handler or resolver needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    repos: Repositories,
    jwt_service: JwtService,
    notifications: NotificationBus,
    hydrator: Hydrator,
    accounts: AccountService,
    directory: DirectoryService,
    memberships: MembershipService,
}

impl AppState {
    pub fn new(repos: Repositories, auth_config: &AuthConfig) -> Self {
        let notifications = NotificationBus::new();
        let jwt_service = JwtService::new(auth_config);
        let password_service = PasswordService::new(auth_config.bcrypt_cost);
        let hydrator = Hydrator::new(repos.clone());

        Self {
            accounts: AccountService::new(
                repos.clone(),
                jwt_service.clone(),
                password_service,
                auth_config.allow_admin_registration,
            ),
            directory: DirectoryService::new(repos.clone(), hydrator.clone(), notifications.clone()),
            memberships: MembershipService::new(
                repos.clone(),
                hydrator.clone(),
                notifications.clone(),
            ),
            repos,
            jwt_service,
            notifications,
            hydrator,
        }
    }

    pub fn repos(&self) -> &Repositories {
        &self.repos
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn directory(&self) -> &DirectoryService {
        &self.directory
    }

    pub fn memberships(&self) -> &MembershipService {
        &self.memberships
    }
}
