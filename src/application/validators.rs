use validator::ValidateLength;

pub const MAX_USERNAME_LEN: u64 = 64;
pub const MAX_PASSWORD_LEN: u64 = 256;

/// Trim and lower-case a username. Tokens carry the normalized form.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Expects an already-normalized username.
pub fn is_valid_username(username: &str) -> bool {
    username.validate_length(Some(1), Some(MAX_USERNAME_LEN), None)
}

pub fn is_valid_password(password: &str) -> bool {
    password.validate_length(Some(1), Some(MAX_PASSWORD_LEN), None)
}

/// Trim and lower-case a search query.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}
