use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{object_id::UserId, Error, Result};

/// Queries shorter than this return nothing, so that a search can't enumerate users.
pub const MIN_SEARCH_LEN: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Clone, Debug, Serialize)]
pub struct User {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default)]
pub struct Users {
    rows: HashMap<UserId, User>,
    /// Lowercased email -> user
    by_email: HashMap<String, UserId>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Users {
    pub fn insert(&mut self, input: NewUser) -> Result<User> {
        self.insert_with_id(UserId::new(), input)
    }

    pub fn insert_with_id(&mut self, user_id: UserId, input: NewUser) -> Result<User> {
        let email_key = normalize_email(&input.email);
        if self.by_email.contains_key(&email_key) {
            return Err(Error::DuplicateEmail(input.email));
        }

        let user = User {
            user_id,
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            created: Utc::now(),
        };

        self.by_email.insert(email_key, user_id);
        self.rows.insert(user_id, user.clone());
        Ok(user)
    }

    pub fn get(&self, user_id: UserId) -> Result<&User> {
        self.rows.get(&user_id).ok_or(Error::NotFound("user"))
    }

    pub fn exists(&self, user_id: UserId) -> bool {
        self.rows.contains_key(&user_id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<&User> {
        self.by_email
            .get(&normalize_email(email))
            .and_then(|id| self.rows.get(id))
            .ok_or(Error::NotFound("user"))
    }

    /// Case-insensitive substring search over name and email, excluding `exclude`.
    pub fn search(&self, query: &str, exclude: Option<UserId>) -> Vec<&User> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        let mut found = self
            .rows
            .values()
            .filter(|u| Some(u.user_id) != exclude)
            .filter(|u| {
                u.name.to_lowercase().contains(&query) || u.email.to_lowercase().contains(&query)
            })
            .collect::<Vec<_>>();

        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.email.cmp(&b.email)));
        found.truncate(MAX_SEARCH_RESULTS);
        found
    }
}
