use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::access::{can, Action, Resource};
use crate::error::{is_unique_violation, AppError};
use crate::movies::repo::Movie;
use crate::reviews::dto::{CreateReviewRequest, UpdateReviewRequest};
use crate::reviews::repo::Review;
use crate::users::repo::User;
use crate::users::services::require_actor;
use crate::validate;

/// One review per (author, movie): a second create on the same movie is a
/// Conflict, not a silent second opinion.
pub async fn create_review(
    db: &PgPool,
    author_id: Uuid,
    movie_id: Uuid,
    req: CreateReviewRequest,
) -> Result<Review, AppError> {
    User::find_by_id(db, author_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Movie::find_by_id(db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;

    validate::check_not_blank(&req.title, "title")?;
    validate::check_not_blank(&req.body, "text")?;
    validate::check_rating(req.rating)?;

    if Review::find_by_author_and_movie(db, author_id, movie_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "you have already reviewed this movie".into(),
        ));
    }

    let review = Review::insert(
        db,
        author_id,
        movie_id,
        req.title.trim(),
        req.body.trim(),
        req.rating,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("you have already reviewed this movie".into())
        } else {
            AppError::from(e)
        }
    })?;

    info!(review_id = %review.id, author_id = %author_id, movie_id = %movie_id, "review created");
    Ok(review)
}

pub async fn get_review(db: &PgPool, review_id: Uuid) -> Result<Review, AppError> {
    Review::find_by_id(db, review_id)
        .await?
        .ok_or(AppError::NotFound("review"))
}

pub async fn list_for_movie(db: &PgPool, movie_id: Uuid) -> Result<Vec<Review>, AppError> {
    Movie::find_by_id(db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;
    Ok(Review::list_for_movie(db, movie_id).await?)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Review>, AppError> {
    User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Review::list_by_author(db, user_id).await?)
}

/// Authorship, not movie ownership, controls a review.
pub async fn update_review(
    db: &PgPool,
    acting_user_id: Uuid,
    review_id: Uuid,
    req: UpdateReviewRequest,
) -> Result<Review, AppError> {
    let actor = require_actor(db, acting_user_id).await?;
    let review = Review::find_by_id(db, review_id)
        .await?
        .ok_or(AppError::NotFound("review"))?;

    if !can(
        &actor,
        Action::Edit,
        &Resource::Review {
            author_id: review.author_id,
        },
    ) {
        return Err(AppError::Forbidden);
    }

    let title = match req.title {
        Some(t) => {
            validate::check_not_blank(&t, "title")?;
            t.trim().to_string()
        }
        None => review.title.clone(),
    };
    let body = match req.body {
        Some(b) => {
            validate::check_not_blank(&b, "text")?;
            b.trim().to_string()
        }
        None => review.body.clone(),
    };
    let rating = req.rating.unwrap_or(review.rating);
    validate::check_rating(rating)?;

    let updated = Review::update(db, review.id, &title, &body, rating).await?;
    info!(review_id = %updated.id, "review updated");
    Ok(updated)
}

pub async fn delete_review(
    db: &PgPool,
    acting_user_id: Uuid,
    review_id: Uuid,
) -> Result<(), AppError> {
    let actor = require_actor(db, acting_user_id).await?;
    let review = Review::find_by_id(db, review_id)
        .await?
        .ok_or(AppError::NotFound("review"))?;

    if !can(
        &actor,
        Action::Delete,
        &Resource::Review {
            author_id: review.author_id,
        },
    ) {
        return Err(AppError::Forbidden);
    }

    if Review::delete(db, review.id).await? == 0 {
        return Err(AppError::NotFound("review"));
    }
    info!(review_id = %review.id, "review deleted");
    Ok(())
}
