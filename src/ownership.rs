use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Blog, Category, User};
use crate::error::ApiError;

/// Entities resolved along the owner chain. Handlers receive everything that
/// was loaded so they never repeat a lookup within one request.
#[derive(Debug)]
pub struct OwnerChain {
    pub user: User,
    pub category: Option<Category>,
    pub blog: Option<Blog>,
}

pub async fn resolve_user(pool: &PgPool, user_id: Uuid) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, created_at, updated_at
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Single lookup filtered by owner: existence and ownership are checked in
/// one query, so a category owned by another user is indistinguishable from
/// a missing one.
pub async fn resolve_category(
    pool: &PgPool,
    user_id: Uuid,
    category_id: Uuid,
) -> Result<Category, ApiError> {
    sqlx::query_as::<_, Category>(
        "SELECT id, title, user_id, created_at, updated_at
         FROM categories WHERE id = $1 AND user_id = $2",
    )
    .bind(category_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Category not found"))
}

pub async fn resolve_blog(
    pool: &PgPool,
    user_id: Uuid,
    category_id: Uuid,
    blog_id: Uuid,
) -> Result<Blog, ApiError> {
    sqlx::query_as::<_, Blog>(
        "SELECT id, title, content, user_id, category_id, created_at, updated_at
         FROM blogs WHERE id = $1 AND user_id = $2 AND category_id = $3",
    )
    .bind(blog_id)
    .bind(user_id)
    .bind(category_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Blog not found"))
}

/// Validate the full containment chain for a request: the user must exist,
/// the category (when given) must belong to the user, and the blog (when
/// given) must belong to both. Read-only; the first failing link wins.
pub async fn resolve_chain(
    pool: &PgPool,
    user_id: Uuid,
    category_id: Option<Uuid>,
    blog_id: Option<Uuid>,
) -> Result<OwnerChain, ApiError> {
    let user = resolve_user(pool, user_id).await?;

    let category = match category_id {
        Some(cid) => Some(resolve_category(pool, user_id, cid).await?),
        None => None,
    };

    let blog = match (category_id, blog_id) {
        (Some(cid), Some(bid)) => Some(resolve_blog(pool, user_id, cid, bid).await?),
        _ => None,
    };

    Ok(OwnerChain {
        user,
        category,
        blog,
    })
}
