use ideaboard_db::Role;
use serde::Serialize;

/// What a user may do with one resource. This is never stored; it is derived from
/// ownership or the membership role whenever it is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_contribute: bool,
    pub can_manage_members: bool,
}

impl PermissionSet {
    /// No access at all.
    pub const NONE: PermissionSet = PermissionSet {
        can_view: false,
        can_edit: false,
        can_contribute: false,
        can_manage_members: false,
    };

    pub const OWNER: PermissionSet = PermissionSet {
        can_view: true,
        can_edit: true,
        can_contribute: true,
        can_manage_members: true,
    };
}

/// Map a membership role to its permissions.
///
/// Editors can change content but not the team. Only ownership grants
/// `can_manage_members`, so no role maps to it here.
pub const fn derive(role: Role) -> PermissionSet {
    match role {
        Role::Editor => PermissionSet {
            can_view: true,
            can_edit: true,
            can_contribute: true,
            can_manage_members: false,
        },
        Role::Contributor => PermissionSet {
            can_view: true,
            can_edit: false,
            can_contribute: true,
            can_manage_members: false,
        },
        Role::Viewer => PermissionSet {
            can_view: true,
            can_edit: false,
            can_contribute: false,
            can_manage_members: false,
        },
    }
}

/// A user's standing on a resource, from no access up to ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    NoAccess,
    Member(Role),
    Owner,
}

impl Access {
    pub const fn permissions(&self) -> PermissionSet {
        match self {
            Access::NoAccess => PermissionSet::NONE,
            Access::Member(role) => derive(*role),
            Access::Owner => PermissionSet::OWNER,
        }
    }
}

impl From<Access> for PermissionSet {
    fn from(access: Access) -> Self {
        access.permissions()
    }
}
