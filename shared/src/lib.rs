pub mod types;
pub mod error;
pub mod config;
pub mod password;
pub mod store;
pub mod users;
pub mod accounts;
pub mod profiles;
pub mod catalog;
pub mod availability;
pub mod response;

use availability::GuideBoxClient;
use catalog::{Catalog, TmdbClient};
use config::Config;
use std::sync::Arc;
use store::DynamoStore;
use users::Users;

/// Shared application state
pub struct AppState {
    pub users: Users,
    pub catalog: Catalog,
    pub availability: Option<GuideBoxClient>,
}

impl AppState {
    pub fn new(users: Users, catalog: Catalog, availability: Option<GuideBoxClient>) -> Arc<Self> {
        Arc::new(Self {
            users,
            catalog,
            availability,
        })
    }

    /// Build the production clients once at cold start.
    pub async fn from_config(config: &Config) -> Arc<Self> {
        let store = DynamoStore::from_config(config).await;

        Self::new(
            Users::new(Arc::new(store)),
            Catalog::new(Arc::new(TmdbClient::new(config.tmdb_api_key.clone()))),
            config.guidebox_api_key.clone().map(GuideBoxClient::new),
        )
    }
}
