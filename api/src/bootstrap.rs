//! Seed users into a fresh store at startup. The store lives in memory, so this is the only
//! way to hand out the first API keys.

use std::path::Path;

use anyhow::Context;
use ideaboard_db::users::{NewUser, User};
use tracing::{event, Level};

use crate::shared_state::InnerState;

pub struct BootstrappedUser {
    pub user: User,
    pub api_key: String,
}

impl std::fmt::Debug for BootstrappedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrappedUser")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Parse a JSON array of users. A single object is accepted as a list of one.
pub fn parse_users(data: &str) -> Result<Vec<NewUser>, anyhow::Error> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    let users = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(value)?],
        _ => anyhow::bail!("Expected a user object or a list of them, found {value}"),
    };

    Ok(users)
}

pub fn bootstrap_users(
    state: &InnerState,
    users: Vec<NewUser>,
) -> Result<Vec<BootstrappedUser>, anyhow::Error> {
    users
        .into_iter()
        .map(|input| {
            let email = input.email.clone();
            let user = state
                .db
                .transaction(|tables| tables.users.insert(input))
                .with_context(|| format!("Creating user {email}"))?;
            let key = state.api_keys.create_key(
                user.user_id,
                Some("bootstrap".to_string()),
                None,
            )?;

            event!(Level::INFO, user=%user.user_id, %email, "bootstrapped user");
            Ok(BootstrappedUser {
                user,
                api_key: key.key,
            })
        })
        .collect()
}

pub fn bootstrap_from_file(
    state: &InnerState,
    path: &Path,
) -> Result<Vec<BootstrappedUser>, anyhow::Error> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Reading bootstrap file {}", path.display()))?;
    let users = parse_users(&data)?;
    bootstrap_users(state, users)
}
