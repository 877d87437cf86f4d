use assert_matches::assert_matches;
use ideaboard_auth::{permissions::derive, Access, AuthorizationEngine, Error, PermissionSet};
use ideaboard_db::{
    content::{NewBookmark, NewNote, NewReference, NewTopic},
    object_id::{ResourceId, UserId},
    resources::ResourceUpdate,
    users::NewUser,
    ActivityAction, Database, ReferenceKind, ResourceKind, Role,
};
use ideaboard_test::{race, TRACING};

struct TestApp {
    engine: AuthorizationEngine,
}

impl TestApp {
    fn new() -> Self {
        once_cell::sync::Lazy::force(&TRACING);
        TestApp {
            engine: AuthorizationEngine::new(Database::new()),
        }
    }

    fn user(&self, name: &str) -> UserId {
        self.engine
            .db()
            .transaction(|t| {
                t.users.insert(NewUser {
                    name: name.to_string(),
                    email: format!("{name}@example.com"),
                })
            })
            .expect("creating user")
            .user_id
    }

    fn idea(&self, owner: UserId, title: &str) -> ResourceId {
        self.create(owner, ResourceKind::Idea, title)
    }

    fn project(&self, owner: UserId, title: &str) -> ResourceId {
        self.create(owner, ResourceKind::Project, title)
    }

    fn create(&self, owner: UserId, kind: ResourceKind, title: &str) -> ResourceId {
        self.engine
            .create_resource(owner, kind, title.to_string(), String::new())
            .expect("creating resource")
            .resource
            .resource_id
    }
}

fn note(title: &str) -> NewNote {
    NewNote {
        title: title.to_string(),
        content: "Some thoughts".to_string(),
    }
}

fn reference(title: &str) -> NewReference {
    NewReference {
        title: title.to_string(),
        url: "https://example.com/paper".to_string(),
        description: String::new(),
        kind: ReferenceKind::Research,
    }
}

fn topic(title: &str) -> NewTopic {
    NewTopic {
        title: title.to_string(),
        description: String::new(),
        color: None,
    }
}

fn bookmark(title: &str) -> NewBookmark {
    NewBookmark {
        title: title.to_string(),
        url: "https://example.com/docs".to_string(),
        description: String::new(),
    }
}

fn not_found(what: &'static str) -> Error {
    Error::Store(ideaboard_db::Error::NotFound(what))
}

#[test]
fn owner_has_every_permission_and_no_membership_row() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let idea = app.idea(owner, "Idea");
    let project = app.project(owner, "Project");

    for resource in [idea, project] {
        let perms = app.engine.permissions_for(owner, resource);
        assert_eq!(perms, PermissionSet::OWNER);
        assert!(perms.can_manage_members);
        assert_eq!(app.engine.access_for(owner, resource), Access::Owner);
        assert_matches!(
            app.engine.get_member(owner, resource, owner),
            Err(e) if e == not_found("membership")
        );
        assert!(app.engine.list_members(owner, resource).unwrap().is_empty());
    }

    assert_matches!(
        app.engine.add_member(owner, idea, owner, Role::Editor),
        Err(Error::Store(ideaboard_db::Error::SelfMembership))
    );
}

#[test]
fn no_access_without_membership() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let stranger = app.user("stranger");
    let idea = app.idea(owner, "Idea");

    assert_eq!(app.engine.permissions_for(stranger, idea), PermissionSet::NONE);
    assert_eq!(app.engine.access_for(stranger, idea), Access::NoAccess);
    assert_eq!(
        app.engine.permissions_for(stranger, ResourceId::new()),
        PermissionSet::NONE
    );
}

#[test]
fn final_permissions_follow_the_last_role() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");

    app.engine
        .add_member(owner, idea, member, Role::Viewer)
        .unwrap();
    assert_eq!(app.engine.permissions_for(member, idea), derive(Role::Viewer));

    for role in [Role::Editor, Role::Contributor, Role::Viewer, Role::Editor, Role::Contributor] {
        let updated = app.engine.change_role(owner, idea, member, role).unwrap();
        assert_eq!(updated.role, role);
        assert_eq!(app.engine.permissions_for(member, idea), derive(role));
    }

    let perms = app.engine.permissions_for(member, idea);
    assert!(!perms.can_edit, "no edit left over from the editor role");
    assert!(!perms.can_manage_members);
}

#[test]
fn adding_twice_is_a_duplicate() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");

    let membership = app
        .engine
        .add_member(owner, idea, member, Role::Contributor)
        .unwrap();
    assert_eq!(membership.added_by, owner);
    assert_eq!(membership.role, Role::Contributor);

    assert_matches!(
        app.engine.add_member(owner, idea, member, Role::Viewer),
        Err(Error::Store(ideaboard_db::Error::DuplicateMember))
    );
    assert_eq!(
        app.engine.get_member(owner, idea, member).unwrap().role,
        Role::Contributor
    );
}

#[test]
fn removing_twice_is_not_found() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");

    app.engine
        .add_member(owner, idea, member, Role::Viewer)
        .unwrap();
    app.engine.remove_member(owner, idea, member).unwrap();
    assert_matches!(
        app.engine.remove_member(owner, idea, member),
        Err(e) if e == not_found("membership")
    );
    assert_eq!(app.engine.permissions_for(member, idea), PermissionSet::NONE);
}

#[test]
fn owner_can_not_be_removed() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let idea = app.idea(owner, "Idea");

    assert_matches!(
        app.engine.remove_member(owner, idea, owner),
        Err(Error::CannotRemoveOwner)
    );
    assert_eq!(app.engine.permissions_for(owner, idea), PermissionSet::OWNER);
}

#[test]
fn contributor_is_invalid_on_projects() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let project = app.project(owner, "Project");

    assert_matches!(
        app.engine.add_member(owner, project, member, Role::Contributor),
        Err(Error::Store(ideaboard_db::Error::InvalidRole(_)))
    );
    assert!(app.engine.list_members(owner, project).unwrap().is_empty());

    app.engine
        .add_member(owner, project, member, Role::Viewer)
        .unwrap();
    assert_matches!(
        app.engine.change_role(owner, project, member, Role::Contributor),
        Err(Error::Store(ideaboard_db::Error::InvalidRole(_)))
    );
    assert_eq!(
        app.engine.get_member(owner, project, member).unwrap().role,
        Role::Viewer
    );
}

#[test]
fn editors_do_not_manage_members() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let editor = app.user("editor");
    let other = app.user("other");
    let idea = app.idea(owner, "Idea");

    app.engine
        .add_member(owner, idea, editor, Role::Editor)
        .unwrap();
    app.engine
        .add_member(owner, idea, other, Role::Viewer)
        .unwrap();

    assert_matches!(
        app.engine.add_member(editor, idea, app.user("new"), Role::Viewer),
        Err(Error::Forbidden)
    );
    assert_matches!(
        app.engine.change_role(editor, idea, other, Role::Editor),
        Err(Error::Forbidden)
    );
    assert_matches!(
        app.engine.remove_member(editor, idea, other),
        Err(Error::Forbidden)
    );

    // Content edits are allowed.
    let updated = app
        .engine
        .update_resource(
            editor,
            idea,
            ResourceUpdate {
                title: Some("Renamed".to_string()),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Renamed");

    // But deleting is only for the owner.
    assert_matches!(app.engine.delete_resource(editor, idea), Err(Error::Forbidden));
    assert!(app.engine.get_resource(owner, idea).is_ok());
}

#[test]
fn viewers_can_not_edit() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let viewer = app.user("viewer");
    let idea = app.idea(owner, "Idea");
    app.engine
        .add_member(owner, idea, viewer, Role::Viewer)
        .unwrap();

    assert_matches!(
        app.engine
            .update_resource(viewer, idea, ResourceUpdate::default()),
        Err(Error::Forbidden)
    );

    let view = app.engine.get_resource(viewer, idea).unwrap();
    assert_eq!(view.permissions, derive(Role::Viewer));
}

#[test]
fn hidden_resources_look_missing() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let stranger = app.user("stranger");
    let idea = app.idea(owner, "Secret");
    let missing = ResourceId::new();

    for resource in [idea, missing] {
        assert_matches!(app.engine.get_resource(stranger, resource), Err(e) if e == not_found("resource"));
        assert_matches!(app.engine.list_members(stranger, resource), Err(e) if e == not_found("resource"));
        assert_matches!(app.engine.get_member(stranger, resource, owner), Err(e) if e == not_found("resource"));
        assert_matches!(app.engine.linked_resources(stranger, resource), Err(e) if e == not_found("resource"));
        assert_matches!(app.engine.activities(stranger, resource), Err(e) if e == not_found("resource"));

        // Mutations answer Forbidden for both.
        assert_matches!(
            app.engine.add_member(stranger, resource, stranger, Role::Viewer),
            Err(Error::Forbidden)
        );
        assert_matches!(app.engine.delete_resource(stranger, resource), Err(Error::Forbidden));
        assert_matches!(
            app.engine
                .update_resource(stranger, resource, ResourceUpdate::default()),
            Err(Error::Forbidden)
        );
    }
}

#[test]
fn link_needs_edit_on_both_ends() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let actor = app.user("actor");
    let idea = app.idea(actor, "Idea");
    let project = app.project(owner, "Project");

    app.engine
        .add_member(owner, project, actor, Role::Viewer)
        .unwrap();

    assert_matches!(
        app.engine.link_resources(actor, idea, project),
        Err(Error::Forbidden)
    );
    assert!(app.engine.linked_resources(actor, idea).unwrap().is_empty());
    assert!(app.engine.linked_resources(owner, project).unwrap().is_empty());

    // Unknown project is also Forbidden and leaves nothing behind.
    assert_matches!(
        app.engine.link_resources(actor, idea, ResourceId::new()),
        Err(Error::Forbidden)
    );
    assert!(app.engine.linked_resources(actor, idea).unwrap().is_empty());
}

#[test]
fn unlink_needs_edit_on_both_ends() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let actor = app.user("actor");
    let idea = app.idea(owner, "Idea");
    let project = app.project(owner, "Project");

    app.engine.link_resources(owner, idea, project).unwrap();
    app.engine
        .add_member(owner, idea, actor, Role::Editor)
        .unwrap();
    app.engine
        .add_member(owner, project, actor, Role::Viewer)
        .unwrap();

    assert_matches!(
        app.engine.unlink_resources(actor, idea, project),
        Err(Error::Forbidden)
    );
    assert_matches!(
        app.engine.unlink_resources(actor, project, idea),
        Err(Error::Forbidden)
    );

    let linked = app
        .engine
        .linked_resources(owner, idea)
        .unwrap()
        .into_iter()
        .map(|r| r.resource.resource_id)
        .collect::<Vec<_>>();
    assert_eq!(linked, vec![project]);

    // Editor on the project as well is enough.
    app.engine
        .change_role(owner, project, actor, Role::Editor)
        .unwrap();
    app.engine.unlink_resources(actor, idea, project).unwrap();
    assert!(app.engine.linked_resources(owner, idea).unwrap().is_empty());
}

#[test]
fn link_kind_mismatch_and_duplicates() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let idea = app.idea(owner, "Idea");
    let other_idea = app.idea(owner, "Other idea");
    let project = app.project(owner, "Project");

    assert_matches!(
        app.engine.link_resources(owner, idea, other_idea),
        Err(Error::Store(ideaboard_db::Error::KindMismatch { .. }))
    );
    assert_matches!(
        app.engine.link_resources(owner, project, idea),
        Err(Error::Store(ideaboard_db::Error::KindMismatch { .. }))
    );

    app.engine.link_resources(owner, idea, project).unwrap();
    assert_matches!(
        app.engine.link_resources(owner, idea, project),
        Err(Error::Store(ideaboard_db::Error::DuplicateLink))
    );

    app.engine.unlink_resources(owner, idea, project).unwrap();
    assert_matches!(
        app.engine.unlink_resources(owner, idea, project),
        Err(e) if e == not_found("link")
    );
}

#[test]
fn contributor_promoted_to_editor_can_link() {
    let app = TestApp::new();
    let a = app.user("alice");
    let b = app.user("bob");
    let c = app.user("carol");
    let idea = app.idea(a, "Idea I");
    let project = app.project(c, "Project P");

    app.engine
        .add_member(a, idea, b, Role::Contributor)
        .unwrap();
    app.engine
        .add_member(c, project, b, Role::Editor)
        .unwrap();

    assert_matches!(
        app.engine.add_member(b, idea, app.user("dave"), Role::Viewer),
        Err(Error::Forbidden)
    );
    assert_matches!(
        app.engine.link_resources(b, idea, project),
        Err(Error::Forbidden)
    );

    app.engine.change_role(a, idea, b, Role::Editor).unwrap();
    let link = app.engine.link_resources(b, idea, project).unwrap();
    assert_eq!(link.idea_id, idea);
    assert_eq!(link.project_id, project);

    let projects = app.engine.linked_resources(b, idea).unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].resource.resource_id, project);

    let ideas = app.engine.linked_resources(c, project).unwrap();
    assert!(ideas.is_empty(), "carol can't view the idea");
    let ideas = app.engine.linked_resources(b, project).unwrap();
    assert_eq!(ideas[0].resource.resource_id, idea);
}

#[test]
fn delete_cascades() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");
    let project = app.project(owner, "Project");

    app.engine
        .add_member(owner, idea, member, Role::Editor)
        .unwrap();
    app.engine.link_resources(owner, idea, project).unwrap();

    let deleted = app.engine.delete_resource(owner, idea).unwrap();
    assert_eq!(deleted.resource.resource_id, idea);
    assert_eq!(deleted.memberships.len(), 1);
    assert_eq!(deleted.links.len(), 1);

    assert_matches!(app.engine.list_members(owner, idea), Err(e) if e == not_found("resource"));
    assert_eq!(app.engine.permissions_for(member, idea), PermissionSet::NONE);
    assert!(app.engine.linked_resources(owner, project).unwrap().is_empty());
    assert!(app
        .engine
        .accessible_resources(member, None)
        .is_empty());
    assert_matches!(app.engine.delete_resource(owner, idea), Err(Error::Forbidden));
}

#[test]
fn accessible_resources_by_kind() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let own_idea = app.idea(member, "Mine");
    let shared_project = app.project(owner, "Shared");
    app.project(owner, "Private");

    app.engine
        .add_member(owner, shared_project, member, Role::Viewer)
        .unwrap();

    let all = app.engine.accessible_resources(member, None);
    assert_eq!(all.len(), 2);
    assert!(all
        .windows(2)
        .all(|w| w[0].resource.created >= w[1].resource.created));

    let ideas = app
        .engine
        .accessible_resources(member, Some(ResourceKind::Idea));
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].resource.resource_id, own_idea);
    assert_eq!(ideas[0].permissions, PermissionSet::OWNER);

    let projects = app
        .engine
        .accessible_resources(member, Some(ResourceKind::Project));
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].resource.resource_id, shared_project);
    assert_eq!(projects[0].permissions, derive(Role::Viewer));
}

#[test]
fn activity_feed_records_mutations() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");
    let project = app.project(owner, "Project");

    app.engine
        .add_member(owner, idea, member, Role::Viewer)
        .unwrap();
    app.engine
        .change_role(owner, idea, member, Role::Editor)
        .unwrap();
    app.engine.link_resources(owner, idea, project).unwrap();
    app.engine.remove_member(owner, idea, member).unwrap();

    let actions = app
        .engine
        .activities(owner, idea)
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect::<Vec<_>>();
    assert_eq!(
        actions,
        vec![
            ActivityAction::MemberRemoved,
            ActivityAction::Linked,
            ActivityAction::RoleChanged,
            ActivityAction::MemberAdded,
            ActivityAction::Created,
        ]
    );

    let project_actions = app
        .engine
        .activities(owner, project)
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect::<Vec<_>>();
    assert_eq!(
        project_actions,
        vec![ActivityAction::Linked, ActivityAction::Created]
    );

    // A failed mutation leaves no entry.
    app.engine
        .add_member(owner, idea, owner, Role::Viewer)
        .unwrap_err();
    assert_eq!(app.engine.activities(owner, idea).unwrap().len(), 5);
}

#[test]
fn contributors_add_notes_and_references() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let contributor = app.user("contributor");
    let viewer = app.user("viewer");
    let stranger = app.user("stranger");
    let idea = app.idea(owner, "Idea");

    app.engine
        .add_member(owner, idea, contributor, Role::Contributor)
        .unwrap();
    app.engine
        .add_member(owner, idea, viewer, Role::Viewer)
        .unwrap();

    let added = app
        .engine
        .add_note(contributor, idea, note("Pricing"))
        .unwrap();
    assert_eq!(added.author_id, contributor);
    let added = app
        .engine
        .add_reference(contributor, idea, reference("Paper"))
        .unwrap();
    assert_eq!(added.added_by, contributor);
    assert_eq!(added.kind, ReferenceKind::Research);

    for actor in [viewer, stranger] {
        assert_matches!(
            app.engine.add_note(actor, idea, note("Nope")),
            Err(Error::Forbidden)
        );
        assert_matches!(
            app.engine.add_reference(actor, idea, reference("Nope")),
            Err(Error::Forbidden)
        );
    }

    let notes = app.engine.list_notes(viewer, idea).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Pricing");
    assert_eq!(app.engine.list_references(viewer, idea).unwrap().len(), 1);
    assert_matches!(
        app.engine.list_notes(stranger, idea),
        Err(e) if e == not_found("resource")
    );
    assert_matches!(
        app.engine.list_references(stranger, idea),
        Err(e) if e == not_found("resource")
    );

    let latest = app.engine.activities(owner, idea).unwrap();
    assert_eq!(latest[0].action, ActivityAction::ReferenceAdded);
    assert_eq!(latest[0].user_id, contributor);
    assert_eq!(latest[1].action, ActivityAction::NoteAdded);
}

#[test]
fn notes_and_references_belong_to_ideas() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let project = app.project(owner, "Project");

    assert_matches!(
        app.engine.add_note(owner, project, note("Note")),
        Err(Error::Store(ideaboard_db::Error::KindMismatch { .. }))
    );
    assert_matches!(
        app.engine.add_reference(owner, project, reference("Paper")),
        Err(Error::Store(ideaboard_db::Error::KindMismatch { .. }))
    );
    assert_matches!(
        app.engine.list_notes(owner, project),
        Err(Error::Store(ideaboard_db::Error::KindMismatch { .. }))
    );
    assert_matches!(
        app.engine.add_note(owner, ResourceId::new(), note("Note")),
        Err(Error::Forbidden)
    );
}

#[test]
fn project_topics_and_bookmarks_need_edit() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let editor = app.user("editor");
    let viewer = app.user("viewer");
    let project = app.project(owner, "Project");
    let idea = app.idea(owner, "Idea");

    app.engine
        .add_member(owner, project, editor, Role::Editor)
        .unwrap();
    app.engine
        .add_member(owner, project, viewer, Role::Viewer)
        .unwrap();

    app.engine
        .add_topic(editor, project, topic("Design"))
        .unwrap();
    app.engine
        .add_bookmark(editor, project, bookmark("Docs"))
        .unwrap();

    assert_matches!(
        app.engine.add_topic(viewer, project, topic("Research")),
        Err(Error::Forbidden)
    );
    assert_matches!(
        app.engine.add_bookmark(viewer, project, bookmark("Other")),
        Err(Error::Forbidden)
    );
    assert_matches!(
        app.engine.add_topic(owner, project, topic("Design")),
        Err(Error::Store(ideaboard_db::Error::DuplicateTopic(_)))
    );
    assert_matches!(
        app.engine.add_topic(owner, idea, topic("Design")),
        Err(Error::Store(ideaboard_db::Error::KindMismatch { .. }))
    );

    assert_eq!(app.engine.list_topics(viewer, project).unwrap().len(), 1);
    let bookmarks = app.engine.list_bookmarks(viewer, project).unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].created_by, editor);
}

#[test]
fn delete_removes_attached_content() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let idea = app.idea(owner, "Idea");
    let project = app.project(owner, "Project");

    app.engine.add_note(owner, idea, note("Note")).unwrap();
    app.engine
        .add_reference(owner, idea, reference("Paper"))
        .unwrap();
    app.engine.add_topic(owner, project, topic("Topic")).unwrap();
    app.engine
        .add_bookmark(owner, project, bookmark("Docs"))
        .unwrap();

    app.engine.delete_resource(owner, idea).unwrap();
    app.engine.delete_resource(owner, project).unwrap();

    app.engine.db().read(|tables| {
        assert_eq!(tables.notes.iter(idea).count(), 0);
        assert_eq!(tables.references.iter(idea).count(), 0);
        assert_eq!(tables.topics.iter(project).count(), 0);
        assert_eq!(tables.bookmarks.iter(project).count(), 0);
    });
    assert_matches!(
        app.engine.list_notes(owner, idea),
        Err(e) if e == not_found("resource")
    );
}

#[test]
fn concurrent_removes_succeed_once() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");

    for _ in 0..20 {
        app.engine
            .add_member(owner, idea, member, Role::Viewer)
            .unwrap();

        let results = race(2, |_| app.engine.remove_member(owner, idea, member));
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1, "exactly one remove wins: {results:?}");
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(e) if *e == not_found("membership"))));
        assert!(app.engine.list_members(owner, idea).unwrap().is_empty());
    }
}

#[test]
fn concurrent_adds_produce_one_row() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let member = app.user("member");
    let idea = app.idea(owner, "Idea");

    let results = race(8, |_| {
        app.engine.add_member(owner, idea, member, Role::Viewer)
    });
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(Error::Store(ideaboard_db::Error::DuplicateMember))))
            .count(),
        7
    );
    assert_eq!(app.engine.list_members(owner, idea).unwrap().len(), 1);
}

#[test]
fn concurrent_link_and_unlink_in_both_orders() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let idea = app.idea(owner, "Idea");
    let project = app.project(owner, "Project");

    // Half the callers link, half unlink. Each thread locks the pair with the ids given in
    // a different order, which must not deadlock.
    let results = race(8, |i| {
        for _ in 0..50 {
            if i % 2 == 0 {
                app.engine.link_resources(owner, idea, project).ok();
            } else {
                app.engine.unlink_resources(owner, idea, project).ok();
            }
        }
    });
    assert_eq!(results.len(), 8);

    let linked = app.engine.linked_resources(owner, idea).unwrap();
    assert!(linked.len() <= 1);
    let back = app.engine.linked_resources(owner, project).unwrap();
    assert_eq!(linked.len(), back.len(), "both indexes agree");
}

#[test]
fn delete_races_with_membership_changes() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let members = (0..6)
        .map(|i| app.user(&format!("member{i}")))
        .collect::<Vec<_>>();
    let idea = app.idea(owner, "Idea");

    let results = race(members.len() + 1, |i| {
        if i == members.len() {
            app.engine.delete_resource(owner, idea).map(|_| ())
        } else {
            app.engine
                .add_member(owner, idea, members[i], Role::Viewer)
                .map(|_| ())
        }
    });

    // The delete always wins, and whatever landed before it went with it.
    assert!(results[members.len()].is_ok());
    for member in members {
        assert!(app.engine.accessible_resources(member, None).is_empty());
        assert_eq!(app.engine.permissions_for(member, idea), PermissionSet::NONE);
    }
}
