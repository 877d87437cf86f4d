use std::sync::Arc;

use ideaboard_auth::{api_key::ApiKeyManager, AuthorizationEngine};
use ideaboard_db::Database;

#[derive(Debug)]
pub struct InnerState {
    pub production: bool,
    pub db: Database,
    pub engine: AuthorizationEngine,
    pub api_keys: ApiKeyManager,
}

impl InnerState {
    /// Build the state around a store. The engine and the key manager share it.
    pub fn new(db: Database, production: bool) -> Self {
        InnerState {
            production,
            engine: AuthorizationEngine::new(db.clone()),
            api_keys: ApiKeyManager::new(db.clone()),
            db,
        }
    }
}

pub type AppState = Arc<InnerState>;
