pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let password_hash = match password {
            Some(password) => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| {
                        sqlx::Error::Configuration(
                            format!("Password hashing failed: {}", e).into(),
                        )
                    })?
                    .to_string();
                Some(hash)
            }
            None => None,
        };

        let result = sqlx::query("INSERT INTO users (email, name, password_hash) VALUES (?, ?, ?)")
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Create a test outfit with no items
    pub async fn create_test_outfit(
        pool: &SqlitePool,
        user_id: i64,
        name: &str,
        is_private: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO outfits (user_id, name, description, tags, is_private)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind("Test outfit description")
        .bind(r#"["test"]"#)
        .bind(is_private)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}

#[cfg(test)]
pub async fn create_test_user(
    pool: &sqlx::SqlitePool,
    email: &str,
    password: &str,
) -> Result<i64, sqlx::Error> {
    test_helpers::insert_test_user(pool, email, "Test User", Some(password)).await
}

#[cfg(test)]
pub use test_helpers::create_test_outfit;
