pub mod extractor;
pub mod handlers;
pub mod middleware;

pub use extractor::{AuthUser, MaybeUser};

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";
