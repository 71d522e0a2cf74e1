use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub is_admin: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, is_admin, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, is_admin, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, is_admin, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Login lookup: the identity may be a username or an e-mail address.
    pub async fn find_by_identity(db: &PgPool, identity: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, is_admin, password_hash, created_at
            FROM users
            WHERE username = $1 OR email = $1
            "#,
        )
        .bind(identity)
        .fetch_optional(db)
        .await
    }

    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, is_admin, password_hash, created_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn insert(
        db: &PgPool,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: Option<&str>,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, first_name, last_name, is_admin, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: Option<&str>,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, first_name = $4, last_name = $5
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, is_admin, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(db)
        .await
    }

    pub async fn set_password(db: &PgPool, id: Uuid, password_hash: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Remove a user and everything hanging off it inside the caller's
    /// transaction: reviews on movies the user owns, reviews the user
    /// authored elsewhere, watch-list links, owned movies, then the user
    /// row itself. Returns the number of user rows removed.
    pub async fn delete_cascade_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> sqlx::Result<u64> {
        sqlx::query(
            "DELETE FROM reviews WHERE movie_id IN (SELECT id FROM movies WHERE owner_id = $1)",
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM reviews WHERE author_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM user_movies
            WHERE user_id = $1
               OR movie_id IN (SELECT id FROM movies WHERE owner_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM movies WHERE owner_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
