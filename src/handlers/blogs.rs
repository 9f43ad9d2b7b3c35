use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::manager::Database;
use crate::database::models::Blog;
use crate::error::ApiError;
use crate::ident;
use crate::listing::{self, BlogListing};
use crate::ownership;

const BLOG_COLUMNS: &str = "id, title, content, user_id, category_id, created_at, updated_at";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogQuery {
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlogBody {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// GET /api/blogs - filtered, paginated listing for one owned category,
/// newest first
pub async fn get(Query(query): Query<BlogQuery>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::require_id("category ID", query.category_id.as_deref())?;

    let start = query
        .start_date
        .as_deref()
        .map(|raw| listing::parse_date("startDate", raw))
        .transpose()?;
    let end = query
        .end_date
        .as_deref()
        .map(|raw| listing::parse_date("endDate", raw))
        .transpose()?;

    let pool = Database::pool().await?;
    ownership::resolve_chain(pool, user_id, Some(category_id), None).await?;

    let page = BlogListing::new(user_id, category_id)
        .search(query.search)
        .date_range(start, end)
        .paging(query.page.as_deref(), query.limit.as_deref())?
        .fetch(pool)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "blogs": page.blogs,
            "totalBlogs": page.total_blogs,
            "totalPages": page.total_pages,
        })),
    ))
}

/// POST /api/blogs?userId=&categoryId= - create a blog under an owned
/// category; the raw title must be unique within that category
pub async fn post(
    Query(query): Query<BlogQuery>,
    Json(body): Json<BlogBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::require_id("category ID", query.category_id.as_deref())?;

    let (title, content) = match (body.title, body.content) {
        (Some(t), Some(c)) if !t.trim().is_empty() && !c.trim().is_empty() => (t, c),
        _ => {
            return Err(ApiError::missing_fields(
                "Title and content are required",
                &["title", "content"],
            ))
        }
    };

    let pool = Database::pool().await?;
    ownership::resolve_chain(pool, user_id, Some(category_id), None).await?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM blogs WHERE user_id = $1 AND category_id = $2 AND title = $3
        )",
    )
    .bind(user_id)
    .bind(category_id)
    .bind(&title)
    .fetch_one(pool)
    .await?;
    if exists {
        return Err(ApiError::conflict("Blog already exists"));
    }

    let blog = sqlx::query_as::<_, Blog>(&format!(
        "INSERT INTO blogs (title, content, user_id, category_id)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        BLOG_COLUMNS
    ))
    .bind(&title)
    .bind(&content)
    .bind(user_id)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "Blog already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "New blog created", "blog": blog })),
    ))
}

/// GET /api/blogs/:blog?userId=&categoryId= - fetch one blog after
/// validating the whole owner chain
pub async fn show(
    Path(blog): Path<String>,
    Query(query): Query<BlogQuery>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::require_id("category ID", query.category_id.as_deref())?;
    let blog_id = ident::require_id("blog ID", Some(blog.as_str()))?;

    let pool = Database::pool().await?;
    let chain = ownership::resolve_chain(pool, user_id, Some(category_id), Some(blog_id)).await?;

    match chain.blog {
        Some(blog) => Ok((
            StatusCode::OK,
            Json(json!({ "title": blog.title, "content": blog.content })),
        )),
        None => Err(ApiError::not_found("Blog not found")),
    }
}

/// PATCH /api/blogs/:blog?userId=&categoryId= - update title and/or content
pub async fn patch(
    Path(blog): Path<String>,
    Query(query): Query<BlogQuery>,
    Json(body): Json<BlogBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::require_id("category ID", query.category_id.as_deref())?;
    let blog_id = ident::require_id("blog ID", Some(blog.as_str()))?;

    let pool = Database::pool().await?;
    ownership::resolve_chain(pool, user_id, Some(category_id), Some(blog_id)).await?;

    let updated = sqlx::query_as::<_, Blog>(&format!(
        "UPDATE blogs
         SET title = COALESCE($2, title),
             content = COALESCE($3, content),
             updated_at = now()
         WHERE id = $1
         RETURNING {}",
        BLOG_COLUMNS
    ))
    .bind(blog_id)
    .bind(body.title.filter(|t| !t.trim().is_empty()))
    .bind(body.content.filter(|c| !c.trim().is_empty()))
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "Blog already exists"))?
    .ok_or_else(|| ApiError::not_found("Blog not found"))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Blog updated", "blog": updated })),
    ))
}

/// DELETE /api/blogs/:blog?userId=&categoryId= - delete one owned blog
pub async fn delete(
    Path(blog): Path<String>,
    Query(query): Query<BlogQuery>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = ident::require_id("user ID", query.user_id.as_deref())?;
    let category_id = ident::require_id("category ID", query.category_id.as_deref())?;
    let blog_id = ident::require_id("blog ID", Some(blog.as_str()))?;

    let pool = Database::pool().await?;
    ownership::resolve_chain(pool, user_id, Some(category_id), Some(blog_id)).await?;

    let deleted = sqlx::query_as::<_, Blog>(&format!(
        "DELETE FROM blogs WHERE id = $1 RETURNING {}",
        BLOG_COLUMNS
    ))
    .bind(blog_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Blog not found"))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Blog deleted", "blog": deleted })),
    ))
}
