//! Membership rows tying one user to one resource with one role.
//!
//! This table enforces the structural invariants only: one row per (resource, user), no
//! row for the owner, and no role that the resource kind does not support. Whether the
//! caller is allowed to make the change is decided before these functions are reached.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    object_id::{ResourceId, UserId},
    resources::Resource,
    Error, Result, Role,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub resource_id: ResourceId,
    pub user_id: UserId,
    pub role: Role,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Memberships {
    /// Rows for each resource, in the order they were created.
    by_resource: HashMap<ResourceId, Vec<Membership>>,
    by_user: HashMap<UserId, BTreeSet<ResourceId>>,
}

impl Memberships {
    pub fn add(
        &mut self,
        resource: &Resource,
        user_id: UserId,
        role: Role,
        added_by: UserId,
    ) -> Result<Membership> {
        if resource.is_owner(user_id) {
            return Err(Error::SelfMembership);
        }

        role.check_valid_for(resource.kind)?;

        if self.get(resource.resource_id, user_id).is_ok() {
            return Err(Error::DuplicateMember);
        }

        let membership = Membership {
            resource_id: resource.resource_id,
            user_id,
            role,
            added_by,
            created_at: Utc::now(),
        };

        self.by_resource
            .entry(resource.resource_id)
            .or_default()
            .push(membership.clone());
        self.by_user
            .entry(user_id)
            .or_default()
            .insert(resource.resource_id);

        Ok(membership)
    }

    /// Replace the role on an existing row. Returns the row as it was before the change.
    pub fn update_role(
        &mut self,
        resource: &Resource,
        user_id: UserId,
        role: Role,
    ) -> Result<Membership> {
        let row = self
            .by_resource
            .get_mut(&resource.resource_id)
            .and_then(|rows| rows.iter_mut().find(|m| m.user_id == user_id))
            .ok_or(Error::NotFound("membership"))?;

        role.check_valid_for(resource.kind)?;

        let previous = row.clone();
        row.role = role;
        Ok(previous)
    }

    /// Delete a row. Deleting a row that is already gone is an error, not a no-op.
    pub fn remove(&mut self, resource_id: ResourceId, user_id: UserId) -> Result<Membership> {
        let rows = self
            .by_resource
            .get_mut(&resource_id)
            .ok_or(Error::NotFound("membership"))?;
        let index = rows
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or(Error::NotFound("membership"))?;

        let removed = rows.remove(index);
        if rows.is_empty() {
            self.by_resource.remove(&resource_id);
        }
        self.unindex_user(user_id, resource_id);

        Ok(removed)
    }

    /// All rows for a resource, oldest first.
    pub fn list(&self, resource_id: ResourceId) -> &[Membership] {
        self.by_resource
            .get(&resource_id)
            .map(|rows| rows.as_slice())
            .unwrap_or_default()
    }

    pub fn get(&self, resource_id: ResourceId, user_id: UserId) -> Result<&Membership> {
        self.list(resource_id)
            .iter()
            .find(|m| m.user_id == user_id)
            .ok_or(Error::NotFound("membership"))
    }

    /// The resources that a user holds a membership on.
    pub fn resources_for_user(&self, user_id: UserId) -> impl Iterator<Item = ResourceId> + '_ {
        self.by_user.get(&user_id).into_iter().flatten().copied()
    }

    pub(crate) fn remove_all(&mut self, resource_id: ResourceId) -> Vec<Membership> {
        let rows = self.by_resource.remove(&resource_id).unwrap_or_default();
        for row in &rows {
            self.unindex_user(row.user_id, resource_id);
        }
        rows
    }

    fn unindex_user(&mut self, user_id: UserId, resource_id: ResourceId) {
        if let Some(resources) = self.by_user.get_mut(&user_id) {
            resources.remove(&resource_id);
            if resources.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
    }
}
