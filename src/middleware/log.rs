use axum::{extract::Request, middleware::Next, response::Response};

/// Request log scoped to the blog surface; everything else is covered by the
/// HTTP trace layer.
pub async fn log_blog_requests(request: Request, next: Next) -> Response {
    if request.uri().path().starts_with("/api/blogs") {
        tracing::info!(
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or(""),
            "blog request"
        );
    }

    next.run(request).await
}
