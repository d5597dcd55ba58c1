use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::users::{
        ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel,
    },
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    security,
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    let (offset, limit) = pagination.normalize();
    let finder = Users::find().order_by_asc(UserCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(offset, limit, total);
    Ok(ApiResponse::success("Users", UserList { items: users }, Some(meta)))
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(user_from_entity);
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::not_found("User")),
    };
    Ok(ApiResponse::success("User", user, None))
}

pub async fn get_user_by_email(state: &AppState, email: &str) -> AppResult<Option<UserModel>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;
    Ok(user)
}

pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    if let Some(name) = payload.full_name.as_deref() {
        validate_full_name(name)?;
    }

    if get_user_by_email(state, &payload.email).await?.is_some() {
        return Err(AppError::Conflict("email already registered".into()));
    }

    let hashed_password = security::hash_password(&payload.password)?;

    let active = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        hashed_password: Set(hashed_password),
        full_name: Set(payload.full_name),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_superuser: Set(payload.is_superuser.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    // The pre-check above can race a concurrent insert; the unique index on
    // email is the authority.
    let user = active
        .insert(&state.orm)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "email already registered"))?;

    tracing::debug!(user_id = %user.id, "user created");

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::not_found("User")),
    };

    if let Some(email) = payload.email.as_deref() {
        validate_email(email)?;
        if email != existing.email
            && get_user_by_email(state, email).await?.is_some()
        {
            return Err(AppError::Conflict("email already registered".into()));
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        validate_password(&password)?;
        active.hashed_password = Set(security::hash_password(&password)?);
    }
    if let Some(full_name) = payload.full_name {
        validate_full_name(&full_name)?;
        active.full_name = Set(Some(full_name));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_superuser) = payload.is_superuser {
        active.is_superuser = Set(is_superuser);
    }
    active.updated_at = Set(Utc::now().into());

    let user = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "email already registered"))?;

    Ok(ApiResponse::success(
        "Updated",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Users::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("User"));
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = email.contains('@')
        && !email.starts_with('@')
        && !email.ends_with('@')
        && !email.contains(char::is_whitespace);
    if !valid {
        return Err(AppError::validation("email", "must be a valid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::validation(
            "password",
            "must be at least 8 characters",
        ));
    }
    Ok(())
}

fn validate_full_name(name: &str) -> AppResult<()> {
    let len = name.chars().count();
    if !(2..=100).contains(&len) {
        return Err(AppError::validation(
            "full_name",
            "must be between 2 and 100 characters",
        ));
    }
    Ok(())
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        is_active: model.is_active,
        is_superuser: model.is_superuser,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_rejects_malformed_addresses() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@leading.com").is_err());
        assert!(validate_email("trailing@").is_err());
        assert!(validate_email("spa ced@example.com").is_err());
    }

    #[test]
    fn password_validation_requires_eight_chars() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }

    #[test]
    fn full_name_length_bounds() {
        assert!(validate_full_name("Jo").is_ok());
        assert!(validate_full_name("J").is_err());
        assert!(validate_full_name(&"x".repeat(101)).is_err());
    }
}
