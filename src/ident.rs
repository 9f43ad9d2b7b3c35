use uuid::Uuid;

use crate::error::ApiError;

/// Returns true iff `s` is a well-formed entity identifier.
pub fn is_valid_id(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}

/// Parse an identifier that is known to be present. Runs before any lookup,
/// so format errors always precede not-found errors.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {}", field)))
}

/// Parse an identifier from an optional query parameter; absent and
/// malformed inputs fail the same way.
pub fn require_id(field: &str, value: Option<&str>) -> Result<Uuid, ApiError> {
    value
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid or missing {}", field)))
}
