use crate::error::{AppError, Result};
use crate::models::OutfitDetails;
use crate::repositories::{OutfitRepository, SlugAssignment};
use crate::services::access::{self, authorize, Operation, OutfitAccess};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use std::sync::Arc;

pub const SLUG_LENGTH: usize = 10;
pub const MAX_SLUG_ATTEMPTS: usize = 5;
pub const SHARE_NOT_FOUND: &str = "Shared outfit not found";

/// Source of candidate share slugs.
#[cfg_attr(test, mockall::automock)]
pub trait SlugGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random alphanumeric slugs from the thread-local CSPRNG.
pub struct RandomSlugGenerator;

impl SlugGenerator for RandomSlugGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SLUG_LENGTH)
            .map(char::from)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub share_url: String,
    pub share_slug: String,
}

pub struct ShareService {
    repository: Arc<dyn OutfitRepository>,
    slugs: Arc<dyn SlugGenerator>,
    base_url: String,
}

impl ShareService {
    pub fn new(
        repository: Arc<dyn OutfitRepository>,
        slugs: Arc<dyn SlugGenerator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            slugs,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn share_url(&self, slug: &str) -> String {
        format!("{}/outfits/share/{}", self.base_url, slug)
    }

    /// Give a public outfit a share link, reusing the existing one if present.
    pub async fn share_outfit(&self, id: i64, caller: i64) -> Result<ShareLink> {
        let details = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(access::OUTFIT_NOT_FOUND))?;

        authorize(
            Some(caller),
            OutfitAccess::from(&details.outfit),
            Operation::Share,
        )?;

        if let Some(slug) = details.outfit.share_slug {
            return Ok(self.link(slug));
        }

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = self.slugs.generate();

            match self.repository.assign_share_slug(id, &candidate).await? {
                SlugAssignment::Assigned => {
                    tracing::info!(outfit_id = id, user_id = caller, "Share link created");
                    return Ok(self.link(candidate));
                }
                SlugAssignment::AlreadyShared(existing) => return Ok(self.link(existing)),
                SlugAssignment::OutfitMissing => {
                    return Err(AppError::not_found(access::OUTFIT_NOT_FOUND));
                }
                SlugAssignment::Collision => {
                    tracing::warn!(outfit_id = id, attempt, "Share slug collision");
                }
            }
        }

        tracing::error!(outfit_id = id, "Exhausted share slug attempts");
        Err(AppError::ServiceUnavailable(
            "Could not allocate a share link, please retry".to_string(),
        ))
    }

    /// Resolve a slug to a public outfit. Private or unknown outfits are not found.
    pub async fn resolve(&self, slug: &str) -> Result<OutfitDetails> {
        self.repository
            .find_public_by_share_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(SHARE_NOT_FOUND))
    }

    fn link(&self, slug: String) -> ShareLink {
        ShareLink {
            share_url: self.share_url(&slug),
            share_slug: slug,
        }
    }
}
