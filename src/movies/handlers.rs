use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::error::AppError;
use crate::metadata::MovieFacts;
use crate::movies::dto::{CreateMovieRequest, FlagsRequest, LookupQuery, UpdateMovieRequest};
use crate::movies::repo::{Movie, MovieWithFlags};
use crate::movies::services;
use crate::state::AppState;

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/lookup", get(lookup_movie))
        .route(
            "/movies/:id",
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
        .route("/movies/:id/flags", put(set_flags))
        .route("/users/:id/movies", get(list_user_movies))
}

#[instrument(skip(state))]
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(services::list_movies(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Movie>, AppError> {
    Ok(Json(services::get_movie(&state, id).await?))
}

#[instrument(skip(state))]
pub async fn list_user_movies(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MovieWithFlags>>, AppError> {
    Ok(Json(services::list_for_user(&state, id).await?))
}

#[instrument(skip(state))]
pub async fn lookup_movie(
    State(state): State<AppState>,
    Query(q): Query<LookupQuery>,
) -> Result<Json<MovieFacts>, AppError> {
    Ok(Json(services::lookup_preview(&state, &q.title, q.year).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<Movie>), AppError> {
    let movie = services::create_movie(&state, acting, payload).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

#[instrument(skip(state, payload))]
pub async fn update_movie(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<Json<Movie>, AppError> {
    Ok(Json(services::update_movie(&state, acting, id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_movie(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_movie(&state, acting, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn set_flags(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FlagsRequest>,
) -> Result<StatusCode, AppError> {
    services::set_flags(&state, acting, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
