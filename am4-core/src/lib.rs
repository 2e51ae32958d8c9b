use std::sync::Arc;

use am4_database::UserStore;

pub mod credentials;
pub mod error;
pub mod notifier;
pub mod provisioning;
pub mod settings;

pub use credentials::CredentialHasher;
pub use error::{ProvisioningError, SettingsError};
pub use notifier::UpdateNotifier;
pub use provisioning::{ProvisionRequest, Provisioned, UserProvisioningService};
pub use settings::UserSettingsService;

/// Services shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub provisioning: Arc<UserProvisioningService>,
    pub settings: Arc<UserSettingsService>,
}

impl AppState {
    /// Wire the services over one store. Pass the observed store so that
    /// settings updates reach the registered hooks.
    pub fn new(users: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self {
            provisioning: Arc::new(UserProvisioningService::new(Arc::clone(&users), hasher)),
            settings: Arc::new(UserSettingsService::new(Arc::clone(&users))),
            users,
        }
    }
}
