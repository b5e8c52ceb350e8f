use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::models::{
    NewOutfit, NewOutfitItem, Outfit, OutfitDetails, OutfitItem, OwnedOutfitRef, OwnerSummary,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, Transaction};

/// Outcome of trying to attach a share slug to an outfit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugAssignment {
    /// The slug was stored on the outfit.
    Assigned,
    /// The outfit already had a slug; it is returned unchanged.
    AlreadyShared(String),
    /// Another outfit already uses this slug.
    Collision,
    /// No outfit with this id exists.
    OutfitMissing,
}

/// Outcome of copying an outfit into another user's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The copy was created with this id.
    Saved(i64),
    /// The source outfit is private.
    Private,
    /// The caller owns the source or already saved it.
    AlreadyOwned,
    /// No outfit with this id exists.
    OutfitMissing,
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait OutfitRepository: Send + Sync {
    async fn create(&self, user_id: i64, outfit: &NewOutfit) -> Result<i64>;
    async fn find_by_id(&self, id: i64) -> Result<Option<OutfitDetails>>;
    async fn find_public_by_share_slug(&self, slug: &str) -> Result<Option<OutfitDetails>>;
    async fn replace(&self, id: i64, user_id: i64, outfit: &NewOutfit) -> Result<bool>;
    async fn delete(&self, id: i64, user_id: i64) -> Result<bool>;

    async fn list_public(&self, limit: i64, offset: i64) -> Result<Vec<OutfitDetails>>;
    async fn count_public(&self) -> Result<i64>;
    async fn list_by_user(&self, user_id: i64, limit: i64, offset: i64)
        -> Result<Vec<OutfitDetails>>;
    async fn count_by_user(&self, user_id: i64) -> Result<i64>;
    async fn list_items_by_user(&self, user_id: i64) -> Result<Vec<OutfitItem>>;

    async fn list_owned_refs(&self, user_id: i64) -> Result<Vec<OwnedOutfitRef>>;
    async fn save_copy(&self, source_id: i64, new_owner_id: i64) -> Result<SaveOutcome>;
    async fn assign_share_slug(&self, id: i64, slug: &str) -> Result<SlugAssignment>;
}

pub struct SqliteOutfitRepository {
    pool: SqlitePool,
}

impl SqliteOutfitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, outfit_ids: &[i64]) -> Result<HashMap<i64, Vec<OutfitItem>>> {
        let mut grouped: HashMap<i64, Vec<OutfitItem>> = HashMap::new();
        if outfit_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, outfit_id, name, category, description, purchase_url, image_url \
             FROM outfit_items WHERE outfit_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in outfit_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY outfit_id, position, id");

        let items = builder
            .build_query_as::<OutfitItem>()
            .fetch_all(&self.pool)
            .await?;

        for item in items {
            grouped.entry(item.outfit_id).or_default().push(item);
        }

        Ok(grouped)
    }

    async fn with_items(&self, rows: Vec<OutfitRow>) -> Result<Vec<OutfitDetails>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let outfit_items = items.remove(&row.id).unwrap_or_default();
                row.into_details(outfit_items)
            })
            .collect()
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        bind: SqlArg<'_>,
    ) -> Result<Option<OutfitDetails>> {
        let sql = format!("{OUTFIT_SELECT} WHERE {clause}");
        let query = sqlx::query_as::<_, OutfitRow>(&sql);
        let query = match bind {
            SqlArg::Int(value) => query.bind(value),
            SqlArg::Text(value) => query.bind(value),
        };

        match query.fetch_optional(&self.pool).await? {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

enum SqlArg<'a> {
    Int(i64),
    Text(&'a str),
}

const OUTFIT_SELECT: &str = r#"
    SELECT o.id, o.user_id, o.name, o.description, o.image_url, o.tags, o.is_private,
           o.share_slug, o.saved_from_id, o.save_count, o.created_at, o.updated_at,
           u.name AS owner_name
    FROM outfits o
    JOIN users u ON u.id = o.user_id
"#;

#[derive(Debug, FromRow)]
struct OutfitRow {
    id: i64,
    user_id: i64,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    tags: String,
    is_private: bool,
    share_slug: Option<String>,
    saved_from_id: Option<i64>,
    save_count: i64,
    created_at: i64,
    updated_at: i64,
    owner_name: String,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl OutfitRow {
    fn into_details(self, items: Vec<OutfitItem>) -> Result<OutfitDetails> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;

        Ok(OutfitDetails {
            outfit: Outfit {
                id: self.id,
                user_id: self.user_id,
                name: self.name,
                description: self.description,
                image_url: self.image_url,
                tags,
                is_private: self.is_private,
                share_slug: self.share_slug,
                saved_from_id: self.saved_from_id,
                save_count: self.save_count,
                created_at: timestamp(self.created_at),
                updated_at: timestamp(self.updated_at),
            },
            user: OwnerSummary {
                name: self.owner_name,
            },
            items,
        })
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    outfit_id: i64,
    items: &[NewOutfitItem],
) -> Result<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO outfit_items
                (outfit_id, name, category, description, purchase_url, image_url, position)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(outfit_id)
        .bind(&item.name)
        .bind(item.category)
        .bind(&item.description)
        .bind(&item.purchase_url)
        .bind(&item.image_url)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl OutfitRepository for SqliteOutfitRepository {
    async fn create(&self, user_id: i64, outfit: &NewOutfit) -> Result<i64> {
        let tags = serde_json::to_string(&outfit.tags)?;
        let mut tx = self.pool.begin().await?;

        let outfit_id = sqlx::query(
            r#"
            INSERT INTO outfits (user_id, name, description, image_url, tags, is_private)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&outfit.name)
        .bind(&outfit.description)
        .bind(&outfit.image_url)
        .bind(tags)
        .bind(outfit.is_private)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        insert_items(&mut tx, outfit_id, &outfit.items).await?;
        tx.commit().await?;

        Ok(outfit_id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<OutfitDetails>> {
        self.fetch_one_where("o.id = ?", SqlArg::Int(id)).await
    }

    async fn find_public_by_share_slug(&self, slug: &str) -> Result<Option<OutfitDetails>> {
        self.fetch_one_where("o.share_slug = ? AND o.is_private = 0", SqlArg::Text(slug))
            .await
    }

    async fn replace(&self, id: i64, user_id: i64, outfit: &NewOutfit) -> Result<bool> {
        let tags = serde_json::to_string(&outfit.tags)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE outfits
            SET name = ?, description = ?, image_url = ?, tags = ?, is_private = ?,
                updated_at = unixepoch()
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&outfit.name)
        .bind(&outfit.description)
        .bind(&outfit.image_url)
        .bind(tags)
        .bind(outfit.is_private)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        // Items are replaced wholesale rather than diffed
        sqlx::query("DELETE FROM outfit_items WHERE outfit_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, &outfit.items).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<bool> {
        // Items cascade and saved copies lose their `saved_from_id` through the schema
        let deleted = sqlx::query("DELETE FROM outfits WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }

    async fn list_public(&self, limit: i64, offset: i64) -> Result<Vec<OutfitDetails>> {
        let sql = format!(
            "{OUTFIT_SELECT} WHERE o.is_private = 0 \
             ORDER BY o.created_at DESC, o.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, OutfitRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        self.with_items(rows).await
    }

    async fn count_public(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outfits WHERE is_private = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OutfitDetails>> {
        let sql = format!(
            "{OUTFIT_SELECT} WHERE o.user_id = ? \
             ORDER BY o.created_at DESC, o.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, OutfitRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        self.with_items(rows).await
    }

    async fn count_by_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outfits WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_items_by_user(&self, user_id: i64) -> Result<Vec<OutfitItem>> {
        let items = sqlx::query_as::<_, OutfitItem>(
            r#"
            SELECT i.id, i.outfit_id, i.name, i.category, i.description, i.purchase_url,
                   i.image_url
            FROM outfit_items i
            JOIN outfits o ON o.id = i.outfit_id
            WHERE o.user_id = ?
            ORDER BY i.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        // Most recent wins when the same piece appears in several outfits
        let mut seen = HashSet::new();
        Ok(items
            .into_iter()
            .filter(|item| seen.insert((item.category, item.name.to_lowercase())))
            .collect())
    }

    async fn list_owned_refs(&self, user_id: i64) -> Result<Vec<OwnedOutfitRef>> {
        let refs = sqlx::query_as::<_, OwnedOutfitRef>(
            "SELECT name, saved_from_id FROM outfits WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(refs)
    }

    async fn save_copy(&self, source_id: i64, new_owner_id: i64) -> Result<SaveOutcome> {
        let mut tx = self.pool.begin().await?;

        // Saved copies start out private in the new owner's collection. The
        // visibility and ownership rules are re-checked in the same statement.
        let inserted = sqlx::query(
            r#"
            INSERT INTO outfits (user_id, name, description, image_url, tags, is_private, saved_from_id)
            SELECT ?, name, description, image_url, tags, 1, id
            FROM outfits
            WHERE id = ?
              AND is_private = 0
              AND user_id != ?
              AND NOT EXISTS (
                  SELECT 1 FROM outfits WHERE user_id = ? AND saved_from_id = ?
              )
            "#,
        )
        .bind(new_owner_id)
        .bind(source_id)
        .bind(new_owner_id)
        .bind(new_owner_id)
        .bind(source_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            let is_private: Option<bool> =
                sqlx::query_scalar("SELECT is_private FROM outfits WHERE id = ?")
                    .bind(source_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return Ok(match is_private {
                None => SaveOutcome::OutfitMissing,
                Some(true) => SaveOutcome::Private,
                Some(false) => SaveOutcome::AlreadyOwned,
            });
        }
        let copy_id = inserted.last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO outfit_items
                (outfit_id, name, category, description, purchase_url, image_url, position)
            SELECT ?, name, category, description, purchase_url, image_url, position
            FROM outfit_items
            WHERE outfit_id = ?
            ORDER BY position, id
            "#,
        )
        .bind(copy_id)
        .bind(source_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE outfits SET save_count = save_count + 1 WHERE id = ?")
            .bind(source_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(SaveOutcome::Saved(copy_id))
    }

    async fn assign_share_slug(&self, id: i64, slug: &str) -> Result<SlugAssignment> {
        let result = sqlx::query(
            "UPDATE outfits SET share_slug = ? WHERE id = ? AND share_slug IS NULL",
        )
        .bind(slug)
        .bind(id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(SlugAssignment::Assigned),
            Ok(_) => {
                // Either the outfit is gone or someone shared it first
                let existing: Option<Option<String>> =
                    sqlx::query_scalar("SELECT share_slug FROM outfits WHERE id = ?")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await?;

                Ok(match existing {
                    Some(Some(slug)) => SlugAssignment::AlreadyShared(slug),
                    Some(None) | None => SlugAssignment::OutfitMissing,
                })
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(SlugAssignment::Collision)
            }
            Err(e) => Err(e.into()),
        }
    }
}
