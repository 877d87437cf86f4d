use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The actor lacks the permission. Also returned for resources that don't exist, so
    /// that callers can't discover them.
    #[error("Forbidden")]
    Forbidden,

    #[error("The owner of a resource can not be removed from it")]
    CannotRemoveOwner,

    #[error("Invalid API key format")]
    InvalidApiKeyFormat,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] ideaboard_db::Error),
}

impl Error {
    /// True for errors that mean the target does not exist or is hidden from the actor.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(ideaboard_db::Error::NotFound(_)))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
