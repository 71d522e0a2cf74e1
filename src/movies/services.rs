use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{can, Action, Resource};
use crate::error::{is_unique_violation, AppError};
use crate::metadata::{MetadataError, MovieFacts};
use crate::movies::dto::{CreateMovieRequest, FlagsRequest, UpdateMovieRequest};
use crate::movies::repo::{Movie, MovieWithFlags};
use crate::state::AppState;
use crate::users::repo::User;
use crate::users::services::require_actor;
use crate::validate;

/// Final attribute set for a new movie: manual fields override looked-up
/// facts, and a lookup miss leaves the manual fields as the only source.
#[derive(Debug, PartialEq)]
pub(crate) struct MovieAttrs {
    pub title: String,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

pub(crate) fn merge_attrs(req: &CreateMovieRequest, facts: Option<MovieFacts>) -> MovieAttrs {
    let facts = facts.unwrap_or_default();
    MovieAttrs {
        // the collaborator's canonical title wins only when no manual
        // title dispute is possible: the request title is what the user
        // asked to add, so prefer the canonical spelling when offered
        title: facts.title.unwrap_or_else(|| req.title.trim().to_string()),
        director: req.director.clone().or(facts.director),
        year: req.year.or(facts.year),
        genre: req.genre.clone().or(facts.genre),
        poster_url: req.poster_url.clone().or(facts.poster_url),
        imdb_rating: req.imdb_rating.or(facts.imdb_rating),
    }
}

fn check_optional_movie_fields(year: Option<i32>, imdb_rating: Option<f64>) -> Result<(), AppError> {
    if let Some(y) = year {
        validate::check_year(y)?;
    }
    if let Some(r) = imdb_rating {
        if !(0.0..=10.0).contains(&r) {
            return Err(AppError::Validation("IMDb rating must be 0-10".into()));
        }
    }
    Ok(())
}

/// Create a movie in the acting user's library, enriched by the metadata
/// collaborator when it answers. A miss or an unreachable collaborator
/// degrades to the manually supplied fields and never fails the create.
pub async fn create_movie(
    state: &AppState,
    acting_user_id: Uuid,
    req: CreateMovieRequest,
) -> Result<Movie, AppError> {
    let owner = User::find_by_id(&state.db, acting_user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    validate::check_not_blank(&req.title, "title")?;
    check_optional_movie_fields(req.year, req.imdb_rating)?;

    let facts = match state.metadata.lookup(req.title.trim(), req.year).await {
        Ok(found) => found,
        Err(MetadataError::Unavailable(e)) => {
            warn!(error = %e, title = %req.title, "metadata lookup unavailable, keeping manual fields");
            None
        }
    };

    let attrs = merge_attrs(&req, facts);

    let mut tx = state.db.begin().await?;
    let movie = Movie::insert_tx(
        &mut tx,
        owner.id,
        &attrs.title,
        attrs.director.as_deref(),
        attrs.year,
        attrs.genre.as_deref(),
        attrs.poster_url.as_deref(),
        attrs.imdb_rating,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("movie already in your library".into())
        } else {
            AppError::from(e)
        }
    })?;
    Movie::upsert_link_tx(
        &mut tx,
        owner.id,
        movie.id,
        req.watched,
        req.planned,
        req.favorite,
    )
    .await?;
    tx.commit().await?;

    info!(movie_id = %movie.id, owner_id = %owner.id, title = %movie.title, "movie created");
    Ok(movie)
}

/// Direct collaborator query, used by the add-movie form to preview what a
/// title resolves to. This is the one place an unreachable collaborator
/// surfaces to the caller.
pub async fn lookup_preview(
    state: &AppState,
    title: &str,
    year: Option<i32>,
) -> Result<MovieFacts, AppError> {
    match state.metadata.lookup(title.trim(), year).await {
        Ok(Some(facts)) => Ok(facts),
        Ok(None) => Err(AppError::NotFound("movie")),
        Err(MetadataError::Unavailable(e)) => Err(AppError::Upstream(e)),
    }
}

pub async fn get_movie(state: &AppState, movie_id: Uuid) -> Result<Movie, AppError> {
    Movie::find_by_id(&state.db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))
}

pub async fn list_movies(state: &AppState) -> Result<Vec<Movie>, AppError> {
    Ok(Movie::list_all(&state.db).await?)
}

pub async fn list_for_user(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<MovieWithFlags>, AppError> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Movie::list_for_user(&state.db, user_id).await?)
}

pub async fn update_movie(
    state: &AppState,
    acting_user_id: Uuid,
    movie_id: Uuid,
    req: UpdateMovieRequest,
) -> Result<Movie, AppError> {
    let actor = require_actor(&state.db, acting_user_id).await?;
    let movie = Movie::find_by_id(&state.db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;

    if !can(
        &actor,
        Action::Edit,
        &Resource::Movie {
            owner_id: movie.owner_id,
        },
    ) {
        return Err(AppError::Forbidden);
    }

    let title = match req.title {
        Some(t) => {
            validate::check_not_blank(&t, "title")?;
            t.trim().to_string()
        }
        None => movie.title.clone(),
    };
    let director = req.director.or_else(|| movie.director.clone());
    let year = req.year.or(movie.year);
    let genre = req.genre.or_else(|| movie.genre.clone());
    let poster_url = req.poster_url.or_else(|| movie.poster_url.clone());
    let imdb_rating = req.imdb_rating.or(movie.imdb_rating);
    check_optional_movie_fields(year, imdb_rating)?;

    let updated = Movie::update(
        &state.db,
        movie.id,
        &title,
        director.as_deref(),
        year,
        genre.as_deref(),
        poster_url.as_deref(),
        imdb_rating,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("movie already in your library".into())
        } else {
            AppError::from(e)
        }
    })?;

    info!(movie_id = %updated.id, "movie updated");
    Ok(updated)
}

/// Delete a movie together with every review referencing it, atomically.
pub async fn delete_movie(
    state: &AppState,
    acting_user_id: Uuid,
    movie_id: Uuid,
) -> Result<(), AppError> {
    let actor = require_actor(&state.db, acting_user_id).await?;
    let movie = Movie::find_by_id(&state.db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;

    if !can(
        &actor,
        Action::Delete,
        &Resource::Movie {
            owner_id: movie.owner_id,
        },
    ) {
        return Err(AppError::Forbidden);
    }

    let mut tx = state.db.begin().await?;
    let removed = Movie::delete_cascade_tx(&mut tx, movie.id).await?;
    if removed == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("movie"));
    }
    tx.commit().await?;

    info!(movie_id = %movie.id, title = %movie.title, "movie deleted");
    Ok(())
}

/// Update the acting user's own watch-list flags on any catalog movie.
pub async fn set_flags(
    state: &AppState,
    acting_user_id: Uuid,
    movie_id: Uuid,
    req: FlagsRequest,
) -> Result<(), AppError> {
    let actor = require_actor(&state.db, acting_user_id).await?;
    Movie::find_by_id(&state.db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;

    Movie::set_link_flags(
        &state.db,
        actor.id,
        movie_id,
        req.watched,
        req.planned,
        req.favorite,
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str) -> CreateMovieRequest {
        CreateMovieRequest {
            title: title.into(),
            year: None,
            director: None,
            genre: None,
            poster_url: None,
            imdb_rating: None,
            watched: false,
            planned: true,
            favorite: false,
        }
    }

    #[test]
    fn lookup_miss_keeps_manual_fields_only() {
        let mut req = request("Backyard Home Video");
        req.year = Some(2019);
        let attrs = merge_attrs(&req, None);
        assert_eq!(attrs.title, "Backyard Home Video");
        assert_eq!(attrs.year, Some(2019));
        assert!(attrs.director.is_none());
        assert!(attrs.genre.is_none());
        assert!(attrs.imdb_rating.is_none());
    }

    #[test]
    fn facts_fill_gaps_manual_overrides_win() {
        let mut req = request("inception");
        req.director = Some("C. Nolan (uncredited cut)".into());
        let facts = MovieFacts {
            title: Some("Inception".into()),
            director: Some("Christopher Nolan".into()),
            year: Some(2010),
            genre: Some("Sci-Fi".into()),
            poster_url: None,
            imdb_rating: Some(8.8),
        };
        let attrs = merge_attrs(&req, Some(facts));
        // canonical title from the collaborator
        assert_eq!(attrs.title, "Inception");
        // manual override beats the looked-up director
        assert_eq!(attrs.director.as_deref(), Some("C. Nolan (uncredited cut)"));
        assert_eq!(attrs.year, Some(2010));
        assert_eq!(attrs.genre.as_deref(), Some("Sci-Fi"));
        assert_eq!(attrs.imdb_rating, Some(8.8));
    }

    #[test]
    fn manual_year_overrides_facts_year() {
        let mut req = request("Inception");
        req.year = Some(2011);
        let facts = MovieFacts {
            year: Some(2010),
            ..MovieFacts::default()
        };
        let attrs = merge_attrs(&req, Some(facts));
        assert_eq!(attrs.year, Some(2011));
    }

    #[test]
    fn optional_field_bounds() {
        assert!(check_optional_movie_fields(Some(2010), Some(8.8)).is_ok());
        assert!(check_optional_movie_fields(None, None).is_ok());
        assert!(check_optional_movie_fields(Some(1600), None).is_err());
        assert!(check_optional_movie_fields(None, Some(10.5)).is_err());
    }
}
