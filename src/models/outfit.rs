use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, Result};

pub const MAX_NAME_LENGTH: usize = 100;

/// Outfits per page on the public feed and "my outfits".
pub const PAGE_SIZE: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    Upperwear,
    Lowerwear,
    Footwear,
    Accessories,
    Outerwear,
}

impl ItemCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ItemCategory::Upperwear => "Upperwear",
            ItemCategory::Lowerwear => "Lowerwear",
            ItemCategory::Footwear => "Footwear",
            ItemCategory::Accessories => "Accessories",
            ItemCategory::Outerwear => "Outerwear",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub share_slug: Option<String>,
    pub saved_from_id: Option<i64>,
    pub save_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutfitItem {
    pub id: i64,
    pub outfit_id: i64,
    pub name: String,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub purchase_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerSummary {
    pub name: String,
}

/// An outfit together with its owner's display name and its items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutfitDetails {
    #[serde(flatten)]
    pub outfit: Outfit,
    pub user: OwnerSummary,
    pub items: Vec<OutfitItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitPage {
    pub outfits: Vec<OutfitDetails>,
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
}

impl OutfitPage {
    pub fn new(outfits: Vec<OutfitDetails>, page: i64, total: i64) -> Self {
        OutfitPage {
            outfits,
            page,
            total_pages: total_pages(total),
            total,
        }
    }
}

/// Number of pages needed for `total` outfits; an empty feed still has one page.
pub fn total_pages(total: i64) -> i64 {
    ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

/// Highest page whose row offset still fits in an `i64`.
const MAX_PAGE: i64 = i64::MAX / PAGE_SIZE;

/// Clamp a requested page number and return it with its row offset.
pub fn page_offset(page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    (page, (page - 1) * PAGE_SIZE)
}

/// Just enough of an outfit to decide whether a caller already owns a copy.
#[derive(Debug, Clone, FromRow)]
pub struct OwnedOutfitRef {
    pub name: String,
    pub saved_from_id: Option<i64>,
}

/// Lower-cased name with surrounding and repeated whitespace removed.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// Request bodies

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutfitPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_private: Option<bool>,
    pub items: Option<Vec<OutfitItemPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutfitItemPayload {
    pub name: Option<String>,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub purchase_url: Option<String>,
    pub image_url: Option<String>,
}

// Service request models

#[derive(Debug, Clone, PartialEq)]
pub struct NewOutfit {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub items: Vec<NewOutfitItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOutfitItem {
    pub name: String,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub purchase_url: Option<String>,
    pub image_url: Option<String>,
}

impl From<OutfitItem> for NewOutfitItem {
    fn from(item: OutfitItem) -> Self {
        NewOutfitItem {
            name: item.name,
            category: item.category,
            description: item.description,
            purchase_url: item.purchase_url,
            image_url: item.image_url,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl OutfitPayload {
    /// Check required fields and normalize the payload into a `NewOutfit`.
    pub fn validate(self) -> Result<NewOutfit> {
        let name = non_empty(self.name)
            .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::Validation(
                "Name must be 100 characters or less".to_string(),
            ));
        }

        let tags = self
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let items = self
            .items
            .unwrap_or_default()
            .into_iter()
            .map(OutfitItemPayload::validate)
            .collect::<Result<Vec<_>>>()?;

        Ok(NewOutfit {
            name,
            description: non_empty(self.description),
            image_url: non_empty(self.image_url),
            tags,
            is_private: self.is_private.unwrap_or(false),
            items,
        })
    }
}

impl OutfitItemPayload {
    fn validate(self) -> Result<NewOutfitItem> {
        let name = non_empty(self.name)
            .ok_or_else(|| AppError::Validation("Item name is required".to_string()))?;

        Ok(NewOutfitItem {
            name,
            category: self.category,
            description: non_empty(self.description),
            purchase_url: non_empty(self.purchase_url),
            image_url: non_empty(self.image_url),
        })
    }
}
