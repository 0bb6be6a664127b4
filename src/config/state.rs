// Application state module
// Shared by every connection: config, storage, repositories and routes

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::handler::auth;
use crate::repository::Repository;
use crate::routing::RouteTable;
use crate::store::FileStore;

pub struct AppState {
    pub config: Config,
    pub users: Repository,
    pub routes: RouteTable,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Build the state, validating the configured route table
    pub fn new(config: &Config) -> Result<Self, String> {
        let routes = RouteTable::from_specs(&config.routes)?;
        let store = Arc::new(FileStore::new(&config.storage.base_dir));
        let users = Repository::new(
            auth::USERS_COLLECTION,
            auth::user_schema(),
            store,
        );

        Ok(Self {
            config: config.clone(),
            users,
            routes,
            cached_access_log: AtomicBool::new(config.logging.access_log),
        })
    }
}
