//! Demo content for a fresh install: a handful of public editorial outfits
//! owned by a passwordless showcase account.

use anyhow::Context;

use crate::models::{ItemCategory, OutfitItemPayload, OutfitPayload};
use crate::services::{CreateUserRequest, OutfitService, UserService};

pub const SHOWCASE_EMAIL: &str = "showcase@unpacked.local";
const SHOWCASE_NAME: &str = "Unpacked Editorial";

struct ShowcaseOutfit {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
    tags: &'static [&'static str],
    items: &'static [(&'static str, ItemCategory)],
}

const SHOWCASE: &[ShowcaseOutfit] = &[
    ShowcaseOutfit {
        name: "Noir Silhouette",
        description: "A masterclass in textural contrast. Combining structured Japanese wool with fluid silk layers.",
        image_url: "https://images.unsplash.com/photo-1515886657613-9f3515b0c78f?q=80&w=1587&auto=format&fit=crop",
        tags: &["avant-garde", "monochrome", "structured"],
        items: &[
            ("Structured Wool Overcoat", ItemCategory::Outerwear),
            ("Fluid Silk Button-Up", ItemCategory::Upperwear),
            ("Tapered Black Trousers", ItemCategory::Lowerwear),
        ],
    },
    ShowcaseOutfit {
        name: "Midnight Architecture",
        description: "Oversized proportions meet sharp tailoring. A statement coat anchored by heavy leather boots.",
        image_url: "https://images.unsplash.com/photo-1510520434124-5bc7e642b61d?q=80&w=1587&auto=format&fit=crop",
        tags: &["editorial", "outerwear", "winter"],
        items: &[
            ("Oversized Tailored Coat", ItemCategory::Outerwear),
            ("Heavy Combat Boots", ItemCategory::Footwear),
            ("Selvedge Denim", ItemCategory::Lowerwear),
        ],
    },
    ShowcaseOutfit {
        name: "Essential Gradient",
        description: "Muted tones blurring the line between casual and refined. Technical fabrics mixed with organic cotton.",
        image_url: "https://images.unsplash.com/photo-1511216335778-7cb8f49fa7a3?q=80&w=1587&auto=format&fit=crop",
        tags: &["technical", "layered", "subdued"],
        items: &[
            ("Technical Shell Jacket", ItemCategory::Outerwear),
            ("Organic Cotton Tee", ItemCategory::Upperwear),
            ("Articulated Cargo Pants", ItemCategory::Lowerwear),
        ],
    },
    ShowcaseOutfit {
        name: "Urban Ascetic",
        description: "Stripped back to the absolute essentials. Drapey linen over wide-leg trousers in pitch black.",
        image_url: "https://images.unsplash.com/photo-1483985988355-763728e1935b?q=80&w=1587&auto=format&fit=crop",
        tags: &["minimal", "linen", "summer-dark"],
        items: &[
            ("Draped Linen Shirt", ItemCategory::Upperwear),
            ("Wide-Leg Trousers", ItemCategory::Lowerwear),
            ("Minimalist Loafers", ItemCategory::Footwear),
        ],
    },
    ShowcaseOutfit {
        name: "The New Standard",
        description: "Reinventing the everyday uniform. Deconstructed blazer paired with relaxed denim and combat boots.",
        image_url: "https://images.unsplash.com/photo-1492707892479-7bc8d5a4ee93?q=80&w=1587&auto=format&fit=crop",
        tags: &["uniform", "deconstructed", "daily"],
        items: &[
            ("Deconstructed Wool Blazer", ItemCategory::Upperwear),
            ("Relaxed Fit Denim", ItemCategory::Lowerwear),
            ("Chunky Chelsea Boots", ItemCategory::Footwear),
        ],
    },
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

impl ShowcaseOutfit {
    fn payload(&self) -> OutfitPayload {
        OutfitPayload {
            name: Some(self.name.to_string()),
            description: Some(self.description.to_string()),
            image_url: Some(self.image_url.to_string()),
            tags: Some(self.tags.iter().map(|t| t.to_string()).collect()),
            is_private: Some(false),
            items: Some(
                self.items
                    .iter()
                    .map(|(name, category)| OutfitItemPayload {
                        name: Some(name.to_string()),
                        category: *category,
                        description: None,
                        purchase_url: None,
                        image_url: None,
                    })
                    .collect(),
            ),
        }
    }
}

/// Create the showcase outfits that the owner does not already have.
pub async fn seed_showcase(
    users: &UserService,
    outfits: &OutfitService,
    owner_email: &str,
) -> anyhow::Result<SeedSummary> {
    let owner = match users.find_user_by_email(owner_email).await? {
        Some(user) => user,
        None => users
            .create_user(CreateUserRequest {
                name: SHOWCASE_NAME.to_string(),
                email: owner_email.to_string(),
                password: None,
            })
            .await
            .context("creating showcase owner")?,
    };

    let existing: Vec<String> = outfits
        .list_owned_names(owner.id)
        .await
        .context("listing existing outfits")?;

    let mut summary = SeedSummary::default();
    for showcase in SHOWCASE {
        if existing.iter().any(|name| name == showcase.name) {
            summary.skipped += 1;
            continue;
        }

        outfits
            .create_outfit(owner.id, showcase.payload())
            .await
            .with_context(|| format!("creating outfit {}", showcase.name))?;
        summary.created += 1;
    }

    tracing::info!(created = summary.created, skipped = summary.skipped, "Seeded showcase outfits");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{SqliteOutfitRepository, SqliteUserRepository};
    use crate::test_utils::create_test_pool;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = create_test_pool().await;
        let users = UserService::new(Arc::new(SqliteUserRepository::new(pool.clone())));
        let outfits = OutfitService::new(Arc::new(SqliteOutfitRepository::new(pool.clone())));

        let first = seed_showcase(&users, &outfits, SHOWCASE_EMAIL).await.unwrap();
        assert_eq!(first, SeedSummary { created: 5, skipped: 0 });

        let second = seed_showcase(&users, &outfits, SHOWCASE_EMAIL).await.unwrap();
        assert_eq!(second, SeedSummary { created: 0, skipped: 5 });

        let feed = outfits.list_public(None).await.unwrap();
        assert_eq!(feed.total, 5);
        assert!(feed.outfits.iter().all(|o| o.items.len() == 3));

        let owner = users.find_user_by_email(SHOWCASE_EMAIL).await.unwrap().unwrap();
        assert!(!owner.has_password());
    }
}
