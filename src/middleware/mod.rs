pub mod auth;
pub mod log;

pub use auth::{require_auth, AuthUser};
pub use log::log_blog_requests;
