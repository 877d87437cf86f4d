pub mod api_key;
mod engine;
mod error;
pub mod extract_token;
pub mod locks;
pub mod permissions;

pub use engine::*;
pub use error::*;
pub use permissions::{Access, PermissionSet};
