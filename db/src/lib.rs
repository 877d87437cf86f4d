mod enums;
mod error;

pub mod activities;
pub mod api_keys;
pub mod content;
pub mod links;
pub mod memberships;
pub mod object_id;
pub mod resources;
pub mod users;

pub use enums::*;
pub use error::*;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    activities::Activities,
    api_keys::ApiKeys,
    content::{
        Bookmark, Collection, NewBookmark, NewNote, NewReference, NewTopic, Note, Reference,
        Topic,
    },
    links::{ResourceGraph, ResourceLink},
    memberships::{Membership, Memberships},
    object_id::{ResourceId, UserId},
    resources::{Resource, Resources},
    users::Users,
};

pub fn new_uuid() -> uuid::Uuid {
    ulid::Ulid::new().into()
}

/// Every table in the store.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: Users,
    pub api_keys: ApiKeys,
    pub resources: Resources,
    pub memberships: Memberships,
    pub links: ResourceGraph,
    pub activities: Activities,
    pub notes: Collection<Note>,
    pub references: Collection<Reference>,
    pub topics: Collection<Topic>,
    pub bookmarks: Collection<Bookmark>,
}

/// What a cascading delete removed along with the resource itself.
#[derive(Debug)]
pub struct DeletedResource {
    pub resource: Resource,
    pub memberships: Vec<Membership>,
    pub links: Vec<ResourceLink>,
}

impl Tables {
    /// Add a membership after checking that both the resource and the user exist.
    pub fn add_membership(
        &mut self,
        resource_id: ResourceId,
        user_id: UserId,
        role: Role,
        added_by: UserId,
    ) -> Result<Membership> {
        let resource = self.resources.get(resource_id)?;
        if !self.users.exists(user_id) {
            return Err(Error::NotFound("user"));
        }

        self.memberships.add(resource, user_id, role, added_by)
    }

    pub fn update_membership_role(
        &mut self,
        resource_id: ResourceId,
        user_id: UserId,
        role: Role,
    ) -> Result<Membership> {
        let resource = self.resources.get(resource_id)?;
        self.memberships.update_role(resource, user_id, role)
    }

    /// The memberships of an existing resource, oldest first.
    pub fn members_of(&self, resource_id: ResourceId) -> Result<&[Membership]> {
        self.resources.get(resource_id)?;
        Ok(self.memberships.list(resource_id))
    }

    pub fn link_resources(
        &mut self,
        idea_id: ResourceId,
        project_id: ResourceId,
    ) -> Result<ResourceLink> {
        let idea = self.resources.get(idea_id)?;
        let project = self.resources.get(project_id)?;
        self.links.link(idea, project)
    }

    /// Fetch a resource and check its kind in one step.
    fn resource_of_kind(&self, resource_id: ResourceId, kind: ResourceKind) -> Result<&Resource> {
        self.resources.get(resource_id)?.expect_kind(kind)
    }

    pub fn add_note(&mut self, idea_id: ResourceId, author: UserId, input: NewNote) -> Result<Note> {
        self.resource_of_kind(idea_id, ResourceKind::Idea)?;
        let note = Note::build(idea_id, author, input)?;
        Ok(self.notes.add(note))
    }

    /// Notes on an idea, newest first.
    pub fn notes_of(&self, idea_id: ResourceId) -> Result<Vec<Note>> {
        self.resource_of_kind(idea_id, ResourceKind::Idea)?;
        Ok(self.notes.list(idea_id))
    }

    pub fn add_reference(
        &mut self,
        idea_id: ResourceId,
        added_by: UserId,
        input: NewReference,
    ) -> Result<Reference> {
        self.resource_of_kind(idea_id, ResourceKind::Idea)?;
        let reference = Reference::build(idea_id, added_by, input)?;
        Ok(self.references.add(reference))
    }

    pub fn references_of(&self, idea_id: ResourceId) -> Result<Vec<Reference>> {
        self.resource_of_kind(idea_id, ResourceKind::Idea)?;
        Ok(self.references.list(idea_id))
    }

    pub fn add_topic(
        &mut self,
        project_id: ResourceId,
        created_by: UserId,
        input: NewTopic,
    ) -> Result<Topic> {
        self.resource_of_kind(project_id, ResourceKind::Project)?;
        let topic = Topic::build(project_id, created_by, input)?;
        self.topics.add_topic(topic)
    }

    pub fn topics_of(&self, project_id: ResourceId) -> Result<Vec<Topic>> {
        self.resource_of_kind(project_id, ResourceKind::Project)?;
        Ok(self.topics.list(project_id))
    }

    pub fn add_bookmark(
        &mut self,
        project_id: ResourceId,
        created_by: UserId,
        input: NewBookmark,
    ) -> Result<Bookmark> {
        self.resource_of_kind(project_id, ResourceKind::Project)?;
        let bookmark = Bookmark::build(project_id, created_by, input)?;
        Ok(self.bookmarks.add(bookmark))
    }

    pub fn bookmarks_of(&self, project_id: ResourceId) -> Result<Vec<Bookmark>> {
        self.resource_of_kind(project_id, ResourceKind::Project)?;
        Ok(self.bookmarks.list(project_id))
    }

    /// Every resource that the user owns or holds a membership on.
    pub fn resources_visible_to(&self, user_id: UserId) -> Vec<&Resource> {
        self.resources
            .owned_by(user_id)
            .chain(
                self.memberships
                    .resources_for_user(user_id)
                    .filter_map(|id| self.resources.get(id).ok()),
            )
            .collect()
    }

    /// Delete a resource together with its memberships, links, attached content and
    /// activity. All of it
    /// happens inside the caller's write section, so no reader sees a membership or a link
    /// that points at a deleted resource.
    pub fn delete_resource(&mut self, resource_id: ResourceId) -> Result<DeletedResource> {
        let resource = self.resources.remove(resource_id)?;
        let memberships = self.memberships.remove_all(resource_id);
        let links = self.links.remove_all(&resource);
        self.activities.remove_all(resource_id);
        self.notes.remove_all(resource_id);
        self.references.remove_all(resource_id);
        self.topics.remove_all(resource_id);
        self.bookmarks.remove_all(resource_id);

        Ok(DeletedResource {
            resource,
            memberships,
            links,
        })
    }
}

/// A handle to the shared store. Cloning it is cheap and every clone sees the same data.
#[derive(Clone, Debug, Default)]
pub struct Database {
    tables: Arc<RwLock<Tables>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the latest committed state.
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read();
        f(&tables)
    }

    /// Run `f` with exclusive access to the tables.
    ///
    /// Table operations validate before they mutate, so a closure that returns early with
    /// `?` leaves nothing half-written as long as its fallible steps come before its
    /// infallible ones.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&mut Tables) -> Result<T, E>) -> Result<T, E> {
        let mut tables = self.tables.write();
        f(&mut tables)
    }
}
