use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Idea,
    Project,
}

impl ResourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Project => "project",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role granted through a membership row. Ownership is not a role; it comes from
/// `Resource::owner_id` and so cannot be represented here.
///
/// The variants are declared in increasing order of capability, so `Ord` follows the
/// role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Contributor,
    Editor,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Contributor => "contributor",
            Self::Editor => "editor",
        }
    }

    /** Return true if this role may be granted on a resource of the given kind */
    pub fn valid_for(&self, kind: ResourceKind) -> bool {
        !matches!((self, kind), (Self::Contributor, ResourceKind::Project))
    }

    /// Fail with `InvalidRole` if this role can't be granted on `kind`.
    pub fn check_valid_for(&self, kind: ResourceKind) -> Result<(), Error> {
        if self.valid_for(kind) {
            Ok(())
        } else {
            Err(Error::InvalidRole(format!("{self} is not a valid role on a {kind}")))
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "contributor" => Ok(Self::Contributor),
            "editor" => Ok(Self::Editor),
            "owner" => Err(Error::InvalidRole(
                "ownership can not be granted through a membership".to_string(),
            )),
            other => Err(Error::InvalidRole(format!("unknown role {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    MemberAdded,
    MemberRemoved,
    RoleChanged,
    Linked,
    Unlinked,
    NoteAdded,
    ReferenceAdded,
    TopicAdded,
    BookmarkAdded,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let desc = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
            Self::RoleChanged => "role_changed",
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
            Self::NoteAdded => "note_added",
            Self::ReferenceAdded => "reference_added",
            Self::TopicAdded => "topic_added",
            Self::BookmarkAdded => "bookmark_added",
        };

        f.write_str(desc)
    }
}

/// What sort of outside material a reference on an idea points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Research,
    #[default]
    Reference,
    Inspiration,
    Competitor,
    Tool,
    Other,
}
