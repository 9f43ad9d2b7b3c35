use axum::{extract::Query, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password;
use crate::database::manager::Database;
use crate::database::models::User;
use crate::error::ApiError;
use crate::ident;
use crate::ownership;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// GET /api/users - fetch one user by id, or list all users
pub async fn get(Query(query): Query<UserQuery>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let pool = Database::pool().await?;

    if let Some(raw) = query.user_id.as_deref() {
        let user_id = ident::parse_id("user ID", raw)?;
        let user = ownership::resolve_user(pool, user_id).await?;

        return Ok((
            StatusCode::OK,
            Json(json!({ "username": user.username, "email": user.email })),
        ));
    }

    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY created_at DESC",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok((StatusCode::OK, Json(json!(users))))
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users - sign up a new user
pub async fn post(Json(body): Json<CreateUser>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (username, email, plaintext) = match (body.username, body.email, body.password) {
        (Some(u), Some(e), Some(p))
            if !u.trim().is_empty() && !e.trim().is_empty() && !p.is_empty() =>
        {
            (u, e, p)
        }
        _ => {
            return Err(ApiError::missing_fields(
                "Username, email and password are required",
                &["username", "email", "password"],
            ))
        }
    };

    let password_hash = password::hash_password(&plaintext)?;

    let pool = Database::pool().await?;
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "User already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub user_id: Option<String>,
    pub new_email: Option<String>,
    pub new_username: Option<String>,
    pub new_password: Option<String>,
}

/// PATCH /api/users - update profile fields; absent fields stay unchanged
pub async fn patch(Json(body): Json<UpdateUser>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let raw = body
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    let user_id = ident::parse_id("user ID", raw)?;

    let new_password_hash = match body.new_password.as_deref() {
        Some(p) if !p.is_empty() => Some(password::hash_password(p)?),
        _ => None,
    };

    let pool = Database::pool().await?;
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET username = COALESCE($2, username),
             email = COALESCE($3, email),
             password_hash = COALESCE($4, password_hash),
             updated_at = now()
         WHERE id = $1
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(body.new_username.filter(|s| !s.is_empty()))
    .bind(body.new_email.filter(|s| !s.is_empty()))
    .bind(new_password_hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "User already exists"))?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "User updated successfully", "user": user })),
    ))
}

/// DELETE /api/users?userId= - delete a user and, through the schema,
/// everything the user owns
pub async fn delete(Query(query): Query<UserQuery>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let raw = query
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    let user_id = ident::parse_id("user ID", raw)?;

    let pool = Database::pool().await?;
    let user = sqlx::query_as::<_, User>(&format!(
        "DELETE FROM users WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "User deleted successfully", "user": user })),
    ))
}
