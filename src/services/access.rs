//! Visibility and ownership rules for outfits.
//!
//! Every outfit endpoint funnels through [`authorize`] with the caller passed
//! in explicitly. Ownership failures on read, update and delete surface as
//! 404 so that other users' private outfits cannot be probed for existence.
//! Save and share on a private outfit answer 403 for everyone, owner included.

use crate::error::{AppError, Result};
use crate::models::Outfit;

pub const OUTFIT_NOT_FOUND: &str = "Outfit not found";
pub const NOT_FOUND_OR_DENIED: &str = "Outfit not found or access denied";
pub const CANNOT_SAVE_PRIVATE: &str = "Cannot save private outfits";
pub const CANNOT_SHARE_PRIVATE: &str = "Cannot share private outfits";
pub const ALREADY_OWNED: &str = "You already have this outfit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Update,
    Delete,
    /// Copy into the caller's collection. `already_has_copy` is true when the
    /// caller owns an outfit saved from this one or with the same normalized name.
    Save { already_has_copy: bool },
    Share,
}

/// The two facts about an outfit that access decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutfitAccess {
    pub owner_id: i64,
    pub is_private: bool,
}

impl From<&Outfit> for OutfitAccess {
    fn from(outfit: &Outfit) -> Self {
        OutfitAccess {
            owner_id: outfit.user_id,
            is_private: outfit.is_private,
        }
    }
}

pub fn authorize(caller: Option<i64>, target: OutfitAccess, operation: Operation) -> Result<()> {
    let is_owner = caller == Some(target.owner_id);

    match operation {
        Operation::Read => {
            if target.is_private && !is_owner {
                return Err(AppError::not_found(OUTFIT_NOT_FOUND));
            }
        }
        Operation::Update | Operation::Delete => {
            if caller.is_none() {
                return Err(AppError::AuthenticationFailed);
            }
            if !is_owner {
                return Err(AppError::not_found(NOT_FOUND_OR_DENIED));
            }
        }
        Operation::Save { already_has_copy } => {
            if caller.is_none() {
                return Err(AppError::AuthenticationFailed);
            }
            if target.is_private {
                return Err(AppError::Forbidden(CANNOT_SAVE_PRIVATE.to_string()));
            }
            if is_owner || already_has_copy {
                return Err(AppError::Conflict(ALREADY_OWNED.to_string()));
            }
        }
        Operation::Share => {
            if caller.is_none() {
                return Err(AppError::AuthenticationFailed);
            }
            if target.is_private {
                return Err(AppError::Forbidden(CANNOT_SHARE_PRIVATE.to_string()));
            }
        }
    }

    Ok(())
}
