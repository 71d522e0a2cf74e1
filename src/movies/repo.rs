use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
    pub created_at: OffsetDateTime,
}

/// A movie joined with the requesting user's watch-list flags.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovieWithFlags {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
    pub created_at: OffsetDateTime,
    pub is_watched: bool,
    pub is_planned: bool,
    pub is_favorite: bool,
}

impl Movie {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, owner_id, title, director, year, genre, poster_url, imdb_rating, created_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, owner_id, title, director, year, genre, poster_url, imdb_rating, created_at
            FROM movies
            ORDER BY title, year
            "#,
        )
        .fetch_all(db)
        .await
    }

    /// Movies on a user's watch list, with their link flags.
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<MovieWithFlags>> {
        sqlx::query_as::<_, MovieWithFlags>(
            r#"
            SELECT m.id, m.owner_id, m.title, m.director, m.year, m.genre,
                   m.poster_url, m.imdb_rating, m.created_at,
                   um.is_watched, um.is_planned, um.is_favorite
            FROM movies m
            JOIN user_movies um ON um.movie_id = m.id
            WHERE um.user_id = $1
            ORDER BY m.title, m.year
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        title: &str,
        director: Option<&str>,
        year: Option<i32>,
        genre: Option<&str>,
        poster_url: Option<&str>,
        imdb_rating: Option<f64>,
    ) -> sqlx::Result<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (id, owner_id, title, director, year, genre, poster_url, imdb_rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_id, title, director, year, genre, poster_url, imdb_rating, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(title)
        .bind(director)
        .bind(year)
        .bind(genre)
        .bind(poster_url)
        .bind(imdb_rating)
        .fetch_one(&mut **tx)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: &str,
        director: Option<&str>,
        year: Option<i32>,
        genre: Option<&str>,
        poster_url: Option<&str>,
        imdb_rating: Option<f64>,
    ) -> sqlx::Result<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies
            SET title = $2, director = $3, year = $4, genre = $5, poster_url = $6, imdb_rating = $7
            WHERE id = $1
            RETURNING id, owner_id, title, director, year, genre, poster_url, imdb_rating, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(director)
        .bind(year)
        .bind(genre)
        .bind(poster_url)
        .bind(imdb_rating)
        .fetch_one(db)
        .await
    }

    /// Create or merge the user's watch-list link. Flags only ever flip on
    /// here, mirroring repeated "add to list" actions.
    pub async fn upsert_link_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        movie_id: Uuid,
        watched: bool,
        planned: bool,
        favorite: bool,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_movies (user_id, movie_id, is_watched, is_planned, is_favorite)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, movie_id) DO UPDATE
            SET is_watched = user_movies.is_watched OR EXCLUDED.is_watched,
                is_planned = user_movies.is_planned OR EXCLUDED.is_planned,
                is_favorite = user_movies.is_favorite OR EXCLUDED.is_favorite
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(watched)
        .bind(planned)
        .bind(favorite)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Overwrite the user's link flags; unspecified flags keep their value.
    pub async fn set_link_flags(
        db: &PgPool,
        user_id: Uuid,
        movie_id: Uuid,
        watched: Option<bool>,
        planned: Option<bool>,
        favorite: Option<bool>,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_movies (user_id, movie_id, is_watched, is_planned, is_favorite)
            VALUES ($1, $2, COALESCE($3, FALSE), COALESCE($4, TRUE), COALESCE($5, FALSE))
            ON CONFLICT (user_id, movie_id) DO UPDATE
            SET is_watched = COALESCE($3, user_movies.is_watched),
                is_planned = COALESCE($4, user_movies.is_planned),
                is_favorite = COALESCE($5, user_movies.is_favorite)
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(watched)
        .bind(planned)
        .bind(favorite)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Remove a movie, its reviews and its watch-list links inside the
    /// caller's transaction. Returns the number of movie rows removed.
    pub async fn delete_cascade_tx(
        tx: &mut Transaction<'_, Postgres>,
        movie_id: Uuid,
    ) -> sqlx::Result<u64> {
        sqlx::query("DELETE FROM reviews WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("DELETE FROM user_movies WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(movie_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
