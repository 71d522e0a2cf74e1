use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::error::AppError;
use crate::reviews::dto::{CreateReviewRequest, UpdateReviewRequest};
use crate::reviews::repo::Review;
use crate::reviews::services;
use crate::state::AppState;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movies/:id/reviews",
            get(list_movie_reviews).post(create_review),
        )
        .route(
            "/reviews/:id",
            get(get_review).patch(update_review).delete(delete_review),
        )
        .route("/users/:id/reviews", get(list_user_reviews))
}

#[instrument(skip(state))]
pub async fn list_movie_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(services::list_for_movie(&state.db, id).await?))
}

#[instrument(skip(state))]
pub async fn list_user_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(services::list_by_user(&state.db, id).await?))
}

#[instrument(skip(state))]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(services::get_review(&state.db, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = services::create_review(&state.db, acting, id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(skip(state, payload))]
pub async fn update_review(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(
        services::update_review(&state.db, acting, id, payload).await?,
    ))
}

#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_review(&state.db, acting, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
