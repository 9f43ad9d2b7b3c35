use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::manager::Database;
use crate::database::models::Category;
use crate::error::ApiError;
use crate::ident;
use crate::ownership;
use crate::title;

const CATEGORY_COLUMNS: &str = "id, title, user_id, created_at, updated_at";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    pub user_id: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub title: Option<String>,
}

fn require_title(body: &CategoryBody) -> Result<&str, ApiError> {
    body.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::missing_fields("Title is required", &["title"]))
}

/// GET /api/categories?userId=[&categoryId=] - one owned category, or all of
/// the user's categories
pub async fn get(Query(query): Query<CategoryQuery>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;

    let pool = Database::pool().await?;
    ownership::resolve_user(pool, user_id).await?;

    if let Some(raw) = query.category_id.as_deref() {
        let category_id = ident::parse_id("category ID", raw)?;
        let category = ownership::resolve_category(pool, user_id, category_id).await?;
        return Ok((StatusCode::OK, Json(json!(category))));
    }

    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE user_id = $1 ORDER BY created_at DESC",
        CATEGORY_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok((StatusCode::OK, Json(json!(categories))))
}

/// POST /api/categories?userId= - create a category; the stored title is the
/// normalized form and must be unique for the owner
pub async fn post(
    Query(query): Query<CategoryQuery>,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let raw_title = require_title(&body)?;

    let pool = Database::pool().await?;
    ownership::resolve_user(pool, user_id).await?;

    let formatted = title::normalize(raw_title);
    if title::is_duplicate(pool, user_id, &formatted, None).await? {
        return Err(ApiError::conflict("Category already exists"));
    }

    let category = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (title, user_id) VALUES ($1, $2) RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(&formatted)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "Category already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Category created successfully", "category": category })),
    ))
}

/// PATCH /api/categories/:category?userId= - rename; the new normalized
/// title must not collide with any of the owner's other categories
pub async fn patch(
    Path(category): Path<String>,
    Query(query): Query<CategoryQuery>,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::parse_id("category ID", &category)?;
    let raw_title = require_title(&body)?;

    let pool = Database::pool().await?;
    ownership::resolve_chain(pool, user_id, Some(category_id), None).await?;

    let formatted = title::normalize(raw_title);
    if title::is_duplicate(pool, user_id, &formatted, Some(category_id)).await? {
        return Err(ApiError::conflict("Category with this title already exists"));
    }

    let updated = sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET title = $2, updated_at = now() WHERE id = $1 RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(category_id)
    .bind(&formatted)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "Category with this title already exists"))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Category updated successfully", "category": updated })),
    ))
}

/// DELETE /api/categories/:category?userId= - delete an owned category and,
/// through the schema, the blogs under it
pub async fn delete(
    Path(category): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::parse_id("category ID", &category)?;

    let pool = Database::pool().await?;
    ownership::resolve_chain(pool, user_id, Some(category_id), None).await?;

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(pool)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Category deleted successfully" })),
    ))
}
