use thiserror::Error;

use crate::{object_id::ResourceId, ResourceKind};

/// Structural errors raised by the tables. None of these are authorization decisions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown {0}")]
    NotFound(&'static str),

    #[error("User is already a member of this resource")]
    DuplicateMember,

    #[error("These resources are already linked")]
    DuplicateLink,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("The owner of a resource can not also be a member of it")]
    SelfMembership,

    #[error("Expected {id} to be a {expected}, but it is a {actual}")]
    KindMismatch {
        id: ResourceId,
        expected: ResourceKind,
        actual: ResourceKind,
    },

    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("This project already has a topic named {0}")]
    DuplicateTopic(String),

    #[error("Invalid URL {0:?}, expected an http or https URL")]
    InvalidUrl(String),

    #[error("{0} is required")]
    MissingField(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
