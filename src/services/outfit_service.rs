use crate::error::{AppError, Result};
use crate::models::outfit::{normalize_name, page_offset, PAGE_SIZE};
use crate::models::{OutfitDetails, OutfitItem, OutfitPage, OutfitPayload};
use crate::repositories::{OutfitRepository, SaveOutcome};
use crate::services::access::{self, authorize, Operation, OutfitAccess};
use std::sync::Arc;

pub struct OutfitService {
    repository: Arc<dyn OutfitRepository>,
}

impl OutfitService {
    pub fn new(repository: Arc<dyn OutfitRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_outfit(&self, user_id: i64, payload: OutfitPayload) -> Result<OutfitDetails> {
        let outfit = payload.validate()?;
        let id = self.repository.create(user_id, &outfit).await?;

        tracing::info!(outfit_id = id, user_id, "Outfit created");

        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AppError::InternalError)
    }

    /// Fetch an outfit the caller is allowed to see.
    pub async fn get_outfit(&self, id: i64, caller: Option<i64>) -> Result<OutfitDetails> {
        let details = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(access::OUTFIT_NOT_FOUND))?;

        authorize(caller, OutfitAccess::from(&details.outfit), Operation::Read)?;
        Ok(details)
    }

    pub async fn update_outfit(
        &self,
        id: i64,
        caller: i64,
        payload: OutfitPayload,
    ) -> Result<OutfitDetails> {
        self.require_owner(id, caller, Operation::Update).await?;

        let outfit = payload.validate()?;
        if !self.repository.replace(id, caller, &outfit).await? {
            return Err(AppError::not_found(access::NOT_FOUND_OR_DENIED));
        }

        tracing::info!(outfit_id = id, user_id = caller, "Outfit updated");

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(access::NOT_FOUND_OR_DENIED))
    }

    pub async fn delete_outfit(&self, id: i64, caller: i64) -> Result<()> {
        self.require_owner(id, caller, Operation::Delete).await?;

        if !self.repository.delete(id, caller).await? {
            return Err(AppError::not_found(access::NOT_FOUND_OR_DENIED));
        }

        tracing::info!(outfit_id = id, user_id = caller, "Outfit deleted");
        Ok(())
    }

    /// Copy a public outfit, with its items, into the caller's collection.
    pub async fn save_outfit(&self, id: i64, caller: i64) -> Result<OutfitDetails> {
        let source = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(access::OUTFIT_NOT_FOUND))?;

        let already_has_copy = self.has_copy(caller, &source).await?;
        authorize(
            Some(caller),
            OutfitAccess::from(&source.outfit),
            Operation::Save { already_has_copy },
        )?;

        // The copy itself re-checks visibility and ownership
        let copy_id = match self.repository.save_copy(id, caller).await? {
            SaveOutcome::Saved(copy_id) => copy_id,
            SaveOutcome::Private => {
                return Err(AppError::Forbidden(access::CANNOT_SAVE_PRIVATE.to_string()))
            }
            SaveOutcome::AlreadyOwned => {
                return Err(AppError::Conflict(access::ALREADY_OWNED.to_string()))
            }
            SaveOutcome::OutfitMissing => {
                return Err(AppError::not_found(access::OUTFIT_NOT_FOUND))
            }
        };

        tracing::info!(outfit_id = id, copy_id, user_id = caller, "Outfit saved");

        self.repository
            .find_by_id(copy_id)
            .await?
            .ok_or(AppError::InternalError)
    }

    pub async fn list_public(&self, page: Option<i64>) -> Result<OutfitPage> {
        let (page, offset) = page_offset(page);
        let outfits = self.repository.list_public(PAGE_SIZE, offset).await?;
        let total = self.repository.count_public().await?;

        Ok(OutfitPage::new(outfits, page, total))
    }

    pub async fn list_for_user(&self, user_id: i64, page: Option<i64>) -> Result<OutfitPage> {
        let (page, offset) = page_offset(page);
        let outfits = self
            .repository
            .list_by_user(user_id, PAGE_SIZE, offset)
            .await?;
        let total = self.repository.count_by_user(user_id).await?;

        Ok(OutfitPage::new(outfits, page, total))
    }

    pub async fn list_items_for_user(&self, user_id: i64) -> Result<Vec<OutfitItem>> {
        self.repository.list_items_by_user(user_id).await
    }

    pub async fn list_owned_names(&self, user_id: i64) -> Result<Vec<String>> {
        let owned = self.repository.list_owned_refs(user_id).await?;
        Ok(owned.into_iter().map(|outfit| outfit.name).collect())
    }

    async fn require_owner(&self, id: i64, caller: i64, operation: Operation) -> Result<()> {
        let details = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(access::NOT_FOUND_OR_DENIED))?;

        authorize(Some(caller), OutfitAccess::from(&details.outfit), operation).map_err(|e| {
            tracing::debug!(outfit_id = id, user_id = caller, "Ownership check failed");
            e
        })
    }

    async fn has_copy(&self, user_id: i64, source: &OutfitDetails) -> Result<bool> {
        let wanted = normalize_name(&source.outfit.name);
        let owned = self.repository.list_owned_refs(user_id).await?;

        Ok(owned.iter().any(|outfit| {
            outfit.saved_from_id == Some(source.outfit.id) || normalize_name(&outfit.name) == wanted
        }))
    }
}
