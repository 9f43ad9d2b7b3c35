use sqlx::PgPool;
use uuid::Uuid;

/// Canonical capitalized form used as the per-owner uniqueness key.
///
/// Each whitespace-separated token gets its first character uppercased; the
/// remaining characters keep whatever case they were typed with. Runs of
/// whitespace collapse to single spaces. Callers must reject empty or blank
/// titles before normalizing.
pub fn normalize(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if another category owned by `owner` already uses `normalized`.
/// `exclude` skips the category being updated so it cannot collide with
/// itself.
pub async fn is_duplicate(
    pool: &PgPool,
    owner: Uuid,
    normalized: &str,
    exclude: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM categories
            WHERE user_id = $1 AND title = $2 AND ($3::uuid IS NULL OR id <> $3)
        )",
    )
    .bind(owner)
    .bind(normalized)
    .bind(exclude)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(normalize("hello world"), "Hello World");
        assert_eq!(normalize("travel tips"), "Travel Tips");
    }

    #[test]
    fn only_first_letters_are_forced_upper() {
        assert_eq!(normalize("ALREADY CAPS"), "ALREADY CAPS");
        assert_eq!(normalize("iPhone tips"), "IPhone Tips");
        assert_eq!(normalize("mixedCASE words"), "MixedCASE Words");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("  a  b"), "A B");
        assert_eq!(normalize("one\t two\n"), "One Two");
    }

    #[test]
    fn single_word_and_punctuation() {
        assert_eq!(normalize("rust"), "Rust");
        assert_eq!(normalize("c++ notes"), "C++ Notes");
    }
}
