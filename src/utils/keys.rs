use uuid::Uuid;

/// Replaces everything except ASCII alphanumerics, `.`, `-` and `_` with `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Random token shared by one submission's resume and metadata keys.
pub fn submission_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn resume_key(timestamp_ms: i64, token: &str, email: &str, filename: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        timestamp_ms,
        token,
        sanitize(email),
        sanitize(filename)
    )
}

pub fn application_key(timestamp_ms: i64, token: &str, email: &str) -> String {
    format!("{}_{}_{}.json", timestamp_ms, token, sanitize(email))
}
