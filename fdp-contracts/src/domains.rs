use crate::error::{EnsError, Result};

/// Top-level domain usernames are registered under.
pub const ENS_DOMAIN: &str = "fds";

const MIN_USERNAME_LENGTH: usize = 4;
const MAX_USERNAME_LENGTH: usize = 82;

/// Usernames are 4 to 82 characters of lowercase ASCII letters, digits,
/// `_` and `-`.
pub fn is_username_valid(username: &str) -> bool {
    (MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username.len())
        && username
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

pub fn assert_username(username: &str) -> Result<()> {
    if !is_username_valid(username) {
        return Err(EnsError::InvalidUsername);
    }
    Ok(())
}
