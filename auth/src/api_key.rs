use base64::Engine;
use chrono::{DateTime, Utc};
use ideaboard_db::{
    api_keys::ApiKey,
    object_id::{ApiKeyId, UserId},
    Database,
};
use tracing::{event, instrument, Level};
use uuid::Uuid;

use crate::Error;

/// Every key starts with this, so leaked keys are easy to grep for.
pub const KEY_PREFIX: &str = "ib1";

/// `ib1.` plus two unpadded base64 encoded UUIDs joined by a `.`
const KEY_LENGTH: usize = KEY_PREFIX.len() + 1 + 22 + 1 + 22;

pub type Hash = blake3::Hash;

pub struct ApiKeyData {
    pub api_key_id: ApiKeyId,
    pub key: String,
    pub prefix: String,
    pub hash: Hash,
}

impl ApiKeyData {
    pub fn new() -> ApiKeyData {
        let id = ApiKeyId::new();
        let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let base64_id = engine.encode(id.as_bytes());
        let random = engine.encode(Uuid::new_v4().as_bytes());
        let key = format!("{KEY_PREFIX}.{base64_id}.{random}");
        let prefix = key[0..10].to_string();
        let hash = hash_key(&key);

        ApiKeyData {
            api_key_id: id,
            key,
            prefix,
            hash,
        }
    }
}

impl Default for ApiKeyData {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ApiKeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyData")
            .field("api_key_id", &self.api_key_id)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

fn hash_key(key: &str) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(key.as_bytes());
    hasher.finalize()
}

fn decode_key(key: &str) -> Result<(ApiKeyId, Hash), Error> {
    if key.len() != KEY_LENGTH {
        return Err(Error::InvalidApiKeyFormat);
    }

    let mut parts = key.split('.');
    if parts.next() != Some(KEY_PREFIX) {
        return Err(Error::InvalidApiKeyFormat);
    }

    let id_portion = parts.next().ok_or(Error::InvalidApiKeyFormat)?;
    let api_key_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(id_portion.as_bytes())
        .map_err(|_| Error::InvalidApiKeyFormat)?;
    let api_key_id = Uuid::from_slice(&api_key_bytes).map_err(|_| Error::InvalidApiKeyFormat)?;

    Ok((ApiKeyId::from_uuid(api_key_id), hash_key(key)))
}

/// Creates and verifies API keys against the key table.
#[derive(Clone, Debug)]
pub struct ApiKeyManager {
    pub db: Database,
}

impl ApiKeyManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Mint a key for a user. The plaintext key is only available on the returned value.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn create_key(
        &self,
        user_id: UserId,
        description: Option<String>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<ApiKeyData, Error> {
        let key = ApiKeyData::new();
        let row = ApiKey {
            api_key_id: key.api_key_id,
            user_id,
            prefix: key.prefix.clone(),
            hash: *key.hash.as_bytes(),
            description,
            active: true,
            expires,
            created: Utc::now(),
        };

        self.db.transaction(|tables| {
            tables.users.get(user_id)?;
            tables.api_keys.insert(row);
            Ok::<_, Error>(())
        })?;

        event!(Level::INFO, api_key_id=%key.api_key_id, user=%user_id, "Created API key");
        Ok(key)
    }

    /// Resolve a key to the user it belongs to.
    pub fn authenticate(&self, key: &str) -> Result<UserId, Error> {
        let (api_key_id, hash) = decode_key(key)?;
        event!(Level::DEBUG, ?api_key_id, "checking key");

        self.db
            .read(|tables| {
                let key = tables.api_keys.lookup(api_key_id, hash.as_bytes()).ok()?;
                // A key only works while its user exists.
                tables.users.exists(key.user_id).then_some(key.user_id)
            })
            .ok_or(Error::Unauthenticated)
    }

    pub fn disable_key(&self, api_key_id: ApiKeyId) -> Result<(), Error> {
        self.db
            .transaction(|tables| tables.api_keys.disable(api_key_id))?;
        event!(Level::INFO, %api_key_id, "Disabled API key");
        Ok(())
    }
}
