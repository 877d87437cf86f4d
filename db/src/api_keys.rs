use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    object_id::{ApiKeyId, UserId},
    Error, Result,
};

#[derive(Clone, Debug, Serialize)]
pub struct ApiKey {
    #[serde(rename = "id")]
    pub api_key_id: ApiKeyId,
    pub user_id: UserId,
    pub prefix: String,
    #[serde(skip)]
    pub hash: [u8; 32],
    pub description: Option<String>,
    pub active: bool,
    pub expires: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ApiKeys {
    rows: HashMap<ApiKeyId, ApiKey>,
}

impl ApiKeys {
    pub fn insert(&mut self, key: ApiKey) {
        self.rows.insert(key.api_key_id, key);
    }

    /// Find an active, unexpired key matching both the id and the hash.
    pub fn lookup(&self, api_key_id: ApiKeyId, hash: &[u8; 32]) -> Result<&ApiKey> {
        let now = Utc::now();
        self.rows
            .get(&api_key_id)
            .filter(|key| key.active && &key.hash == hash)
            .filter(|key| key.expires.map(|e| e > now).unwrap_or(true))
            .ok_or(Error::NotFound("api key"))
    }

    pub fn disable(&mut self, api_key_id: ApiKeyId) -> Result<()> {
        let key = self
            .rows
            .get_mut(&api_key_id)
            .ok_or(Error::NotFound("api key"))?;
        key.active = false;
        Ok(())
    }
}
