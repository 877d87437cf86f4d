//! The authorization engine. Every read and write of memberships and resource links made on
//! behalf of a user goes through here.
//!
//! A mutation locks the resources it touches in [ResourceLocks], checks the actor's
//! permissions against the committed state, and then performs the write in a single
//! transaction. Every other mutation of the same resources holds the same locks, so nothing
//! can change the outcome of the check before the write lands.

use std::sync::Arc;

use ideaboard_db::{
    activities::Activity,
    content::{Bookmark, NewBookmark, NewNote, NewReference, NewTopic, Note, Reference, Topic},
    links::ResourceLink,
    memberships::Membership,
    object_id::{ResourceId, UserId},
    resources::{NewResource, Resource, ResourceUpdate},
    ActivityAction, Database, DeletedResource, ResourceKind, Role, Tables,
};
use serde::Serialize;
use tracing::{event, instrument, Level};

use crate::{
    locks::ResourceLocks,
    permissions::{Access, PermissionSet},
    Error, Result,
};

/// A resource together with what the requesting user may do with it.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceWithPermissions {
    #[serde(flatten)]
    pub resource: Resource,
    pub permissions: PermissionSet,
}

/// The error returned for resources the actor may not see. It is the same value a truly
/// missing resource produces.
fn hidden() -> Error {
    Error::Store(ideaboard_db::Error::NotFound("resource"))
}

/// Work out a user's standing on a resource: owner first, then membership, else nothing.
fn access_in(tables: &Tables, user_id: UserId, resource: &Resource) -> Access {
    if resource.is_owner(user_id) {
        return Access::Owner;
    }

    tables
        .memberships
        .get(resource.resource_id, user_id)
        .map(|m| Access::Member(m.role))
        .unwrap_or(Access::NoAccess)
}

fn permissions_in(tables: &Tables, user_id: UserId, resource: &Resource) -> PermissionSet {
    access_in(tables, user_id, resource).permissions()
}

/// Fetch a resource the actor can view, hiding it otherwise.
fn viewable<'a>(tables: &'a Tables, actor: UserId, resource_id: ResourceId) -> Result<&'a Resource> {
    let resource = tables.resources.get(resource_id).map_err(|_| hidden())?;
    if permissions_in(tables, actor, resource).can_view {
        Ok(resource)
    } else {
        event!(Level::DEBUG, %actor, %resource_id, "resource not visible to actor");
        Err(hidden())
    }
}

/// Fetch a resource and require a permission on it. A missing resource is `Forbidden`, the
/// same as one the actor lacks the permission on.
fn require<'a>(
    tables: &'a Tables,
    actor: UserId,
    resource_id: ResourceId,
    check: impl Fn(&PermissionSet) -> bool,
    permission: &'static str,
) -> Result<&'a Resource> {
    let Ok(resource) = tables.resources.get(resource_id) else {
        event!(Level::DEBUG, %actor, %resource_id, permission, "denied: no such resource");
        return Err(Error::Forbidden);
    };

    if check(&permissions_in(tables, actor, resource)) {
        Ok(resource)
    } else {
        event!(Level::DEBUG, %actor, %resource_id, permission, "denied");
        Err(Error::Forbidden)
    }
}

#[derive(Clone, Debug)]
pub struct AuthorizationEngine {
    db: Database,
    locks: Arc<ResourceLocks>,
}

impl AuthorizationEngine {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            locks: Arc::new(ResourceLocks::new()),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The permissions `user_id` has on a resource. A missing resource gives the empty set,
    /// the same as one the user has no access to.
    pub fn permissions_for(&self, user_id: UserId, resource_id: ResourceId) -> PermissionSet {
        self.access_for(user_id, resource_id).permissions()
    }

    pub fn access_for(&self, user_id: UserId, resource_id: ResourceId) -> Access {
        self.db.read(|tables| {
            tables
                .resources
                .get(resource_id)
                .map(|resource| access_in(tables, user_id, resource))
                .unwrap_or(Access::NoAccess)
        })
    }

    #[instrument(skip(self, title, description))]
    pub fn create_resource(
        &self,
        actor: UserId,
        kind: ResourceKind,
        title: String,
        description: String,
    ) -> Result<ResourceWithPermissions> {
        let resource = self.db.transaction(|tables| {
            tables.users.get(actor)?;
            let resource = tables.resources.insert(NewResource {
                kind,
                owner_id: actor,
                title,
                description,
            });
            tables.activities.record(
                resource.resource_id,
                actor,
                ActivityAction::Created,
                format!("Created {kind} \"{}\"", resource.title),
            );
            Ok::<_, Error>(resource)
        })?;

        event!(Level::INFO, %actor, resource=%resource.resource_id, %kind, "created resource");
        Ok(ResourceWithPermissions {
            resource,
            permissions: PermissionSet::OWNER,
        })
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub fn get_resource(
        &self,
        actor: UserId,
        resource_id: ResourceId,
    ) -> Result<ResourceWithPermissions> {
        self.db.read(|tables| {
            let resource = viewable(tables, actor, resource_id)?;
            Ok(ResourceWithPermissions {
                resource: resource.clone(),
                permissions: permissions_in(tables, actor, resource),
            })
        })
    }

    #[instrument(skip(self))]
    pub fn update_resource(
        &self,
        actor: UserId,
        resource_id: ResourceId,
        update: ResourceUpdate,
    ) -> Result<Resource> {
        let _guard = self.locks.lock(resource_id);
        self.db
            .read(|tables| require(tables, actor, resource_id, |p| p.can_edit, "edit").map(|_| ()))?;

        let resource = self.db.transaction(|tables| {
            let resource = tables.resources.update(resource_id, update)?;
            tables.activities.record(
                resource_id,
                actor,
                ActivityAction::Updated,
                format!("Updated \"{}\"", resource.title),
            );
            Ok::<_, Error>(resource)
        })?;

        event!(Level::INFO, %actor, resource=%resource_id, "updated resource");
        Ok(resource)
    }

    /// Delete a resource with all of its memberships and links. Only the owner may do this.
    /// Editing rights are not enough.
    #[instrument(skip(self))]
    pub fn delete_resource(&self, actor: UserId, resource_id: ResourceId) -> Result<DeletedResource> {
        let _guard = self.locks.lock(resource_id);
        let is_owner = self.db.read(|tables| {
            tables
                .resources
                .get(resource_id)
                .map(|r| r.is_owner(actor))
                .unwrap_or(false)
        });

        if !is_owner {
            event!(Level::DEBUG, %actor, resource=%resource_id, "denied delete: not the owner");
            return Err(Error::Forbidden);
        }

        let deleted = self.db.transaction(|tables| tables.delete_resource(resource_id))?;
        event!(
            Level::INFO,
            %actor,
            resource=%resource_id,
            memberships=deleted.memberships.len(),
            links=deleted.links.len(),
            "deleted resource"
        );
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub fn add_member(
        &self,
        actor: UserId,
        resource_id: ResourceId,
        target: UserId,
        role: Role,
    ) -> Result<Membership> {
        let _guard = self.locks.lock(resource_id);
        self.db.read(|tables| {
            require(tables, actor, resource_id, |p| p.can_manage_members, "manage_members")
                .map(|_| ())
        })?;

        let membership = self.db.transaction(|tables| {
            let name = tables.users.get(target)?.name.clone();
            let membership = tables.add_membership(resource_id, target, role, actor)?;
            tables.activities.record(
                resource_id,
                actor,
                ActivityAction::MemberAdded,
                format!("Added {name} as {role}"),
            );
            Ok::<_, Error>(membership)
        })?;

        event!(Level::INFO, %actor, resource=%resource_id, %target, %role, "added member");
        Ok(membership)
    }

    #[instrument(skip(self))]
    pub fn remove_member(
        &self,
        actor: UserId,
        resource_id: ResourceId,
        target: UserId,
    ) -> Result<Membership> {
        let _guard = self.locks.lock(resource_id);
        let resource = self.db.read(|tables| {
            require(tables, actor, resource_id, |p| p.can_manage_members, "manage_members")
                .cloned()
        })?;

        if resource.is_owner(target) {
            return Err(Error::CannotRemoveOwner);
        }

        let removed = self.db.transaction(|tables| {
            let removed = tables.memberships.remove(resource_id, target)?;
            let name = tables
                .users
                .get(target)
                .map(|u| u.name.clone())
                .unwrap_or_else(|_| target.to_string());
            tables.activities.record(
                resource_id,
                actor,
                ActivityAction::MemberRemoved,
                format!("Removed {name}"),
            );
            Ok::<_, Error>(removed)
        })?;

        event!(Level::INFO, %actor, resource=%resource_id, %target, "removed member");
        Ok(removed)
    }

    /// Replace a member's role. The newest role wins outright; the activity feed keeps a
    /// readable record of the change but nothing reads it back into permissions.
    #[instrument(skip(self))]
    pub fn change_role(
        &self,
        actor: UserId,
        resource_id: ResourceId,
        target: UserId,
        role: Role,
    ) -> Result<Membership> {
        let _guard = self.locks.lock(resource_id);
        self.db.read(|tables| {
            require(tables, actor, resource_id, |p| p.can_manage_members, "manage_members")
                .map(|_| ())
        })?;

        let (previous, updated) = self.db.transaction(|tables| {
            let previous = tables.update_membership_role(resource_id, target, role)?;
            let updated = tables.memberships.get(resource_id, target)?.clone();
            let name = tables
                .users
                .get(target)
                .map(|u| u.name.clone())
                .unwrap_or_else(|_| target.to_string());
            tables.activities.record(
                resource_id,
                actor,
                ActivityAction::RoleChanged,
                format!("Changed {name} from {} to {role}", previous.role),
            );
            Ok::<_, Error>((previous, updated))
        })?;

        event!(
            Level::INFO,
            %actor,
            resource=%resource_id,
            %target,
            from=%previous.role,
            to=%role,
            "changed member role"
        );
        Ok(updated)
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub fn get_member(
        &self,
        actor: UserId,
        resource_id: ResourceId,
        user_id: UserId,
    ) -> Result<Membership> {
        self.db.read(|tables| {
            viewable(tables, actor, resource_id)?;
            let membership = tables.memberships.get(resource_id, user_id)?;
            Ok(membership.clone())
        })
    }

    /// Members of a resource, oldest first. The owner is not in the list.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn list_members(&self, actor: UserId, resource_id: ResourceId) -> Result<Vec<Membership>> {
        self.db.read(|tables| {
            viewable(tables, actor, resource_id)?;
            Ok(tables.members_of(resource_id)?.to_vec())
        })
    }

    /// Link a project to an idea. The actor needs edit rights on both. Both checks happen
    /// before anything is written.
    #[instrument(skip(self))]
    pub fn link_resources(
        &self,
        actor: UserId,
        idea_id: ResourceId,
        project_id: ResourceId,
    ) -> Result<ResourceLink> {
        let _guard = self.locks.lock_pair(idea_id, project_id);
        self.check_link_permissions(actor, idea_id, project_id)?;

        let link = self.db.transaction(|tables| {
            let titles = link_titles(tables, idea_id, project_id)?;
            let link = tables.link_resources(idea_id, project_id)?;
            record_link(tables, actor, link, ActivityAction::Linked, titles);
            Ok::<_, Error>(link)
        })?;

        event!(Level::INFO, %actor, idea=%idea_id, project=%project_id, "linked resources");
        Ok(link)
    }

    #[instrument(skip(self))]
    pub fn unlink_resources(
        &self,
        actor: UserId,
        idea_id: ResourceId,
        project_id: ResourceId,
    ) -> Result<ResourceLink> {
        let _guard = self.locks.lock_pair(idea_id, project_id);
        self.check_link_permissions(actor, idea_id, project_id)?;

        let link = self.db.transaction(|tables| {
            let titles = link_titles(tables, idea_id, project_id)?;
            let link = tables.links.unlink(idea_id, project_id)?;
            record_link(tables, actor, link, ActivityAction::Unlinked, titles);
            Ok::<_, Error>(link)
        })?;

        event!(Level::INFO, %actor, idea=%idea_id, project=%project_id, "unlinked resources");
        Ok(link)
    }

    fn check_link_permissions(
        &self,
        actor: UserId,
        idea_id: ResourceId,
        project_id: ResourceId,
    ) -> Result<()> {
        self.db.read(|tables| {
            require(tables, actor, idea_id, |p| p.can_edit, "edit")?;
            require(tables, actor, project_id, |p| p.can_edit, "edit")?;
            Ok(())
        })
    }

    /// The resources on the other side of a resource's links: projects for an idea, ideas
    /// for a project. Linked resources the actor can't view are left out.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn linked_resources(
        &self,
        actor: UserId,
        resource_id: ResourceId,
    ) -> Result<Vec<ResourceWithPermissions>> {
        self.db.read(|tables| {
            let resource = viewable(tables, actor, resource_id)?;
            let linked = tables
                .links
                .neighbors(resource)
                .into_iter()
                .filter_map(|id| tables.resources.get(id).ok())
                .filter_map(|linked| {
                    let permissions = permissions_in(tables, actor, linked);
                    permissions.can_view.then(|| ResourceWithPermissions {
                        resource: linked.clone(),
                        permissions,
                    })
                })
                .collect();
            Ok(linked)
        })
    }

    /// Every resource the actor owns or belongs to, newest first.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn accessible_resources(
        &self,
        actor: UserId,
        kind: Option<ResourceKind>,
    ) -> Vec<ResourceWithPermissions> {
        let mut resources = self.db.read(|tables| {
            tables
                .resources_visible_to(actor)
                .into_iter()
                .filter(|r| kind.map(|k| r.kind == k).unwrap_or(true))
                .map(|r| ResourceWithPermissions {
                    resource: r.clone(),
                    permissions: permissions_in(tables, actor, r),
                })
                .collect::<Vec<_>>()
        });

        resources.sort_by(|a, b| {
            b.resource
                .created
                .cmp(&a.resource.created)
                .then_with(|| b.resource.resource_id.cmp(&a.resource.resource_id))
        });
        resources
    }

    /// Lock a resource, check one permission on it, then run `write` in a transaction.
    fn guarded_write<T>(
        &self,
        actor: UserId,
        resource_id: ResourceId,
        check: impl Fn(&PermissionSet) -> bool,
        permission: &'static str,
        write: impl FnOnce(&mut Tables) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.locks.lock(resource_id);
        self.db
            .read(|tables| require(tables, actor, resource_id, check, permission).map(|_| ()))?;
        self.db.transaction(write)
    }

    /// Add a note to an idea. Contributors and above may do this.
    #[instrument(skip(self, note))]
    pub fn add_note(&self, actor: UserId, idea_id: ResourceId, note: NewNote) -> Result<Note> {
        let note = self.guarded_write(actor, idea_id, |p| p.can_contribute, "contribute", |tables| {
            let note = tables.add_note(idea_id, actor, note)?;
            tables.activities.record(
                idea_id,
                actor,
                ActivityAction::NoteAdded,
                format!("Added note \"{}\"", note.title),
            );
            Ok(note)
        })?;

        event!(Level::INFO, %actor, idea=%idea_id, note=%note.note_id, "added note");
        Ok(note)
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub fn list_notes(&self, actor: UserId, idea_id: ResourceId) -> Result<Vec<Note>> {
        self.db.read(|tables| {
            viewable(tables, actor, idea_id)?;
            Ok(tables.notes_of(idea_id)?)
        })
    }

    /// Attach a reference link to an idea. Contributors and above may do this.
    #[instrument(skip(self, reference))]
    pub fn add_reference(
        &self,
        actor: UserId,
        idea_id: ResourceId,
        reference: NewReference,
    ) -> Result<Reference> {
        let reference =
            self.guarded_write(actor, idea_id, |p| p.can_contribute, "contribute", |tables| {
                let reference = tables.add_reference(idea_id, actor, reference)?;
                tables.activities.record(
                    idea_id,
                    actor,
                    ActivityAction::ReferenceAdded,
                    format!("Added reference \"{}\"", reference.title),
                );
                Ok(reference)
            })?;

        event!(
            Level::INFO,
            %actor,
            idea=%idea_id,
            reference=%reference.reference_id,
            "added reference"
        );
        Ok(reference)
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub fn list_references(&self, actor: UserId, idea_id: ResourceId) -> Result<Vec<Reference>> {
        self.db.read(|tables| {
            viewable(tables, actor, idea_id)?;
            Ok(tables.references_of(idea_id)?)
        })
    }

    /// Add a topic to a project. Needs edit rights.
    #[instrument(skip(self, topic))]
    pub fn add_topic(&self, actor: UserId, project_id: ResourceId, topic: NewTopic) -> Result<Topic> {
        let topic = self.guarded_write(actor, project_id, |p| p.can_edit, "edit", |tables| {
            let topic = tables.add_topic(project_id, actor, topic)?;
            tables.activities.record(
                project_id,
                actor,
                ActivityAction::TopicAdded,
                format!("Added topic \"{}\"", topic.title),
            );
            Ok(topic)
        })?;

        event!(Level::INFO, %actor, project=%project_id, topic=%topic.topic_id, "added topic");
        Ok(topic)
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub fn list_topics(&self, actor: UserId, project_id: ResourceId) -> Result<Vec<Topic>> {
        self.db.read(|tables| {
            viewable(tables, actor, project_id)?;
            Ok(tables.topics_of(project_id)?)
        })
    }

    /// Save a link on a project. Needs edit rights.
    #[instrument(skip(self, bookmark))]
    pub fn add_bookmark(
        &self,
        actor: UserId,
        project_id: ResourceId,
        bookmark: NewBookmark,
    ) -> Result<Bookmark> {
        let bookmark = self.guarded_write(actor, project_id, |p| p.can_edit, "edit", |tables| {
            let bookmark = tables.add_bookmark(project_id, actor, bookmark)?;
            tables.activities.record(
                project_id,
                actor,
                ActivityAction::BookmarkAdded,
                format!("Added link \"{}\"", bookmark.title),
            );
            Ok(bookmark)
        })?;

        event!(
            Level::INFO,
            %actor,
            project=%project_id,
            bookmark=%bookmark.bookmark_id,
            "added bookmark"
        );
        Ok(bookmark)
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub fn list_bookmarks(&self, actor: UserId, project_id: ResourceId) -> Result<Vec<Bookmark>> {
        self.db.read(|tables| {
            viewable(tables, actor, project_id)?;
            Ok(tables.bookmarks_of(project_id)?)
        })
    }

    /// The activity feed for a resource, newest first.
    #[instrument(level = "DEBUG", skip(self))]
    pub fn activities(&self, actor: UserId, resource_id: ResourceId) -> Result<Vec<Activity>> {
        self.db.read(|tables| {
            viewable(tables, actor, resource_id)?;
            Ok(tables.activities.list(resource_id))
        })
    }
}

/// Titles of both ends of a prospective edge, checking that each end has the right kind.
fn link_titles(
    tables: &Tables,
    idea_id: ResourceId,
    project_id: ResourceId,
) -> Result<(String, String)> {
    let idea = tables
        .resources
        .get(idea_id)?
        .expect_kind(ResourceKind::Idea)?;
    let project = tables
        .resources
        .get(project_id)?
        .expect_kind(ResourceKind::Project)?;
    Ok((idea.title.clone(), project.title.clone()))
}

/// Write a link or unlink entry onto both ends of the edge.
fn record_link(
    tables: &mut Tables,
    actor: UserId,
    link: ResourceLink,
    action: ActivityAction,
    (idea_title, project_title): (String, String),
) {
    let verb = match action {
        ActivityAction::Unlinked => "Unlinked",
        _ => "Linked",
    };

    tables.activities.record(
        link.idea_id,
        actor,
        action,
        format!("{verb} project \"{project_title}\""),
    );
    tables.activities.record(
        link.project_id,
        actor,
        action,
        format!("{verb} idea \"{idea_title}\""),
    );
}
