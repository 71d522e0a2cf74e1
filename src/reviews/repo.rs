use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub movie_id: Uuid,
    pub title: String,
    pub body: String,
    pub rating: f64,
    pub created_at: OffsetDateTime,
}

impl Review {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Review>> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, author_id, movie_id, title, body, rating, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_author_and_movie(
        db: &PgPool,
        author_id: Uuid,
        movie_id: Uuid,
    ) -> sqlx::Result<Option<Review>> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, author_id, movie_id, title, body, rating, created_at
            FROM reviews
            WHERE author_id = $1 AND movie_id = $2
            "#,
        )
        .bind(author_id)
        .bind(movie_id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_for_movie(db: &PgPool, movie_id: Uuid) -> sqlx::Result<Vec<Review>> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, author_id, movie_id, title, body, rating, created_at
            FROM reviews
            WHERE movie_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(movie_id)
        .fetch_all(db)
        .await
    }

    pub async fn list_by_author(db: &PgPool, author_id: Uuid) -> sqlx::Result<Vec<Review>> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, author_id, movie_id, title, body, rating, created_at
            FROM reviews
            WHERE author_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(db)
        .await
    }

    pub async fn insert(
        db: &PgPool,
        author_id: Uuid,
        movie_id: Uuid,
        title: &str,
        body: &str,
        rating: f64,
    ) -> sqlx::Result<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, author_id, movie_id, title, body, rating)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, author_id, movie_id, title, body, rating, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(movie_id)
        .bind(title)
        .bind(body)
        .bind(rating)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: &str,
        body: &str,
        rating: f64,
    ) -> sqlx::Result<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET title = $2, body = $3, rating = $4
            WHERE id = $1
            RETURNING id, author_id, movie_id, title, body, rating, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .bind(rating)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
