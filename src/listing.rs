use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::Blog;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Invalid page parameter: {0}")]
    InvalidPage(String),

    #[error("Invalid limit parameter: {0}")]
    InvalidLimit(String),

    #[error("Invalid {field} parameter: {value}")]
    InvalidDate { field: &'static str, value: String },
}

/// Filter and pagination state for the blog listing endpoint.
///
/// The base filter always constrains owner and category; search and date
/// bounds are layered on top with AND. Results are always newest-first.
pub struct BlogListing {
    user_id: Uuid,
    category_id: Uuid,
    search: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    page: i64,
    limit: i64,
}

/// One page of results plus totals computed over the full filter.
#[derive(Debug)]
pub struct BlogPage {
    pub blogs: Vec<Blog>,
    pub total_blogs: i64,
    pub total_pages: i64,
}

impl BlogListing {
    pub fn new(user_id: Uuid, category_id: Uuid) -> Self {
        Self {
            user_id,
            category_id,
            search: None,
            start_date: None,
            end_date: None,
            page: 1,
            limit: crate::config::config().pagination.default_limit,
        }
    }

    /// Case-insensitive substring search over title OR content.
    pub fn search(mut self, term: Option<String>) -> Self {
        self.search = term.filter(|t| !t.is_empty());
        self
    }

    /// Inclusive creation-time bounds; either side may be open.
    pub fn date_range(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Parse `page`/`limit` query strings. Missing values fall back to page 1
    /// and the configured default. Values below 1 are clamped up rather than
    /// producing a negative skip, and the limit is capped by configuration;
    /// non-numeric input is rejected outright.
    pub fn paging(mut self, page: Option<&str>, limit: Option<&str>) -> Result<Self, ListingError> {
        if let Some(raw) = page {
            let parsed: i64 = raw
                .parse()
                .map_err(|_| ListingError::InvalidPage(raw.to_string()))?;
            self.page = parsed.max(1);
        }
        if let Some(raw) = limit {
            let parsed: i64 = raw
                .parse()
                .map_err(|_| ListingError::InvalidLimit(raw.to_string()))?;
            self.limit = parsed.max(1);
        }
        if let Some(max) = crate::config::config().pagination.max_limit {
            self.limit = self.limit.min(max);
        }
        Ok(self)
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    fn push_filter(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" WHERE user_id = ").push_bind(self.user_id);
        qb.push(" AND category_id = ").push_bind(self.category_id);

        if let Some(term) = &self.search {
            let pattern = like_pattern(term);
            qb.push(" AND (title ILIKE ").push_bind(pattern.clone());
            qb.push(" OR content ILIKE ").push_bind(pattern);
            qb.push(")");
        }

        if let Some(start) = self.start_date {
            qb.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = self.end_date {
            qb.push(" AND created_at <= ").push_bind(end);
        }
    }

    fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(
            "SELECT id, title, content, user_id, category_id, created_at, updated_at FROM blogs",
        );
        self.push_filter(&mut qb);
        qb.push(" ORDER BY created_at DESC");
        qb.push(" LIMIT ").push_bind(self.limit);
        qb.push(" OFFSET ").push_bind(self.skip());
        qb
    }

    fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM blogs");
        self.push_filter(&mut qb);
        qb
    }

    /// Run the count and data queries over the same filter.
    pub async fn fetch(&self, pool: &PgPool) -> Result<BlogPage, sqlx::Error> {
        let mut count = self.count_query();
        let total_blogs: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut select = self.select_query();
        let blogs = select.build_query_as::<Blog>().fetch_all(pool).await?;

        Ok(BlogPage {
            blogs,
            total_blogs,
            total_pages: total_pages(total_blogs, self.limit),
        })
    }
}

/// Ceiling division; zero matches gives zero pages.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Substring match pattern with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Accepts RFC 3339 timestamps or plain dates; a plain date bounds the day
/// at midnight UTC, so an end date of `2024-01-01` keeps entries created up
/// to and including that instant.
pub fn parse_date(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ListingError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ListingError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}
