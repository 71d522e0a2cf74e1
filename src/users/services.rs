use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{can, Action, Actor, Resource};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{is_unique_violation, AppError};
use crate::users::dto::{NewUser, UpdateUserRequest};
use crate::users::repo::User;
use crate::validate;

const MIN_PASSWORD_LEN: usize = 8;

/// Resolve the authenticated id to an acting identity. A valid token for a
/// since-deleted account is treated as unauthenticated.
pub(crate) async fn require_actor(db: &PgPool, user_id: Uuid) -> Result<Actor, AppError> {
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::Unauthorized("account no longer exists"))?;
    Ok(Actor {
        id: user.id,
        is_admin: user.is_admin,
    })
}

fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn create_user(db: &PgPool, new: NewUser) -> Result<User, AppError> {
    let username = new.username.trim().to_string();
    let email = new.email.trim().to_lowercase();
    let first_name = new.first_name.trim().to_string();
    let last_name = new.last_name.as_deref().map(str::trim).filter(|s| !s.is_empty());

    validate::check_username(&username)?;
    validate::check_email(&email)?;
    validate::check_name(&first_name, "first name")?;
    if let Some(last) = last_name {
        validate::check_name(last, "last name")?;
    }
    check_password_strength(&new.password)?;

    if User::find_by_username(db, &username).await?.is_some() {
        warn!(%username, "username already taken");
        return Err(AppError::Conflict("username already taken".into()));
    }
    if User::find_by_email(db, &email).await?.is_some() {
        warn!(%email, "e-mail already registered");
        return Err(AppError::Conflict("e-mail already registered".into()));
    }

    let hash = hash_password(&new.password)?;

    // The unique constraints stay as a backstop for concurrent registration.
    let user = User::insert(db, &username, &email, &first_name, last_name, &hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("username or e-mail already registered".into())
            } else {
                e.into()
            }
        })?;

    info!(user_id = %user.id, %username, "user created");
    Ok(user)
}

pub async fn get_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))
}

pub async fn list_users(db: &PgPool) -> Result<Vec<User>, AppError> {
    Ok(User::list_all(db).await?)
}

pub async fn update_user(
    db: &PgPool,
    acting_user_id: Uuid,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> Result<User, AppError> {
    let actor = require_actor(db, acting_user_id).await?;
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    if !can(&actor, Action::Edit, &Resource::User { id: user.id }) {
        return Err(AppError::Forbidden);
    }

    let username = req
        .username
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| user.username.clone());
    let email = req
        .email
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|| user.email.clone());
    let first_name = req
        .first_name
        .map(|f| f.trim().to_string())
        .unwrap_or_else(|| user.first_name.clone());
    let last_name = req.last_name.or_else(|| user.last_name.clone());

    validate::check_username(&username)?;
    validate::check_email(&email)?;
    validate::check_name(&first_name, "first name")?;
    if let Some(last) = last_name.as_deref() {
        validate::check_name(last, "last name")?;
    }

    if username != user.username && User::find_by_username(db, &username).await?.is_some() {
        return Err(AppError::Conflict("username already taken".into()));
    }
    if email != user.email && User::find_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("e-mail already registered".into()));
    }

    let updated = User::update_profile(
        db,
        user.id,
        &username,
        &email,
        &first_name,
        last_name.as_deref(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("username or e-mail already registered".into())
        } else {
            AppError::from(e)
        }
    })?;

    info!(user_id = %updated.id, "user updated");
    Ok(updated)
}

pub async fn change_password(
    db: &PgPool,
    acting_user_id: Uuid,
    user_id: Uuid,
    current_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let actor = require_actor(db, acting_user_id).await?;
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    if !can(&actor, Action::Edit, &Resource::User { id: user.id }) {
        return Err(AppError::Forbidden);
    }

    if !verify_password(current_password, &user.password_hash)? {
        return Err(AppError::Validation("current password is incorrect".into()));
    }
    if current_password == new_password {
        return Err(AppError::Validation(
            "new password must differ from current password".into(),
        ));
    }
    check_password_strength(new_password)?;

    let hash = hash_password(new_password)?;
    User::set_password(db, user.id, &hash).await?;
    info!(user_id = %user.id, "password changed");
    Ok(())
}

/// Delete an account and cascade all dependent rows in one transaction.
/// Re-deleting an already-deleted user yields NotFound.
pub async fn delete_user(
    db: &PgPool,
    acting_user_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    let actor = require_actor(db, acting_user_id).await?;
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    if !can(&actor, Action::Delete, &Resource::User { id: user.id }) {
        return Err(AppError::Forbidden);
    }

    let mut tx = db.begin().await?;
    let removed = User::delete_cascade_tx(&mut tx, user.id).await?;
    if removed == 0 {
        // Lost the race against a concurrent delete.
        tx.rollback().await?;
        return Err(AppError::NotFound("user"));
    }
    tx.commit().await?;

    info!(user_id = %user.id, username = %user.username, "user deleted");
    Ok(())
}
