pub mod api;
pub mod config;
pub mod notifications;
pub mod store;

use std::sync::Arc;

use anyhow::Result;

use config::Config;
use notifications::NotificationCenter;
use store::{CourseStore, IdentityStore};

pub struct AppState {
    pub config: Config,
    pub identity: Arc<IdentityStore>,
    pub catalog: CourseStore,
    pub notifier: NotificationCenter,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let identity = Arc::new(IdentityStore::open(&config.server.data_dir)?);
        let catalog = CourseStore::new(identity.clone());
        let notifier = NotificationCenter::new(config.notifications.retained);
        Ok(Self {
            config,
            identity,
            catalog,
            notifier,
        })
    }
}
