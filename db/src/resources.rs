use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    object_id::{ResourceId, UserId},
    Error, ResourceKind, Result,
};

/// An idea or a project. The owner never appears in the membership table.
#[derive(Clone, Debug, Serialize)]
pub struct Resource {
    #[serde(rename = "id")]
    pub resource_id: ResourceId,
    pub kind: ResourceKind,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Resource {
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Fail with `KindMismatch` unless this resource is of the `expected` kind.
    pub fn expect_kind(&self, expected: ResourceKind) -> Result<&Self> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(Error::KindMismatch {
                id: self.resource_id,
                expected,
                actual: self.kind,
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub kind: ResourceKind,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct Resources {
    rows: HashMap<ResourceId, Resource>,
    by_owner: HashMap<UserId, BTreeSet<ResourceId>>,
}

impl Resources {
    pub fn insert(&mut self, input: NewResource) -> Resource {
        let now = Utc::now();
        let resource = Resource {
            resource_id: ResourceId::new(),
            kind: input.kind,
            owner_id: input.owner_id,
            title: input.title,
            description: input.description,
            created: now,
            updated: now,
        };

        self.by_owner
            .entry(resource.owner_id)
            .or_default()
            .insert(resource.resource_id);
        self.rows.insert(resource.resource_id, resource.clone());
        resource
    }

    pub fn get(&self, resource_id: ResourceId) -> Result<&Resource> {
        self.rows
            .get(&resource_id)
            .ok_or(Error::NotFound("resource"))
    }

    pub fn update(&mut self, resource_id: ResourceId, update: ResourceUpdate) -> Result<Resource> {
        let resource = self
            .rows
            .get_mut(&resource_id)
            .ok_or(Error::NotFound("resource"))?;

        if let Some(title) = update.title {
            resource.title = title;
        }
        if let Some(description) = update.description {
            resource.description = description;
        }
        resource.updated = Utc::now();

        Ok(resource.clone())
    }

    pub fn owned_by(&self, user_id: UserId) -> impl Iterator<Item = &Resource> + '_ {
        self.by_owner
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.rows.get(id))
    }

    pub(crate) fn remove(&mut self, resource_id: ResourceId) -> Result<Resource> {
        let resource = self
            .rows
            .remove(&resource_id)
            .ok_or(Error::NotFound("resource"))?;

        if let Some(owned) = self.by_owner.get_mut(&resource.owner_id) {
            owned.remove(&resource_id);
            if owned.is_empty() {
                self.by_owner.remove(&resource.owner_id);
            }
        }

        Ok(resource)
    }
}
