/// API key generation
///
/// API keys are 32-character opaque tokens generated once at registration
/// and immutable afterwards. They identify a user directly (the `users`
/// table has a unique index on the column), so generation is the only
/// operation this module needs.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::api_key::{generate_api_key, API_KEY_LENGTH};
///
/// let key = generate_api_key();
/// assert_eq!(key.len(), API_KEY_LENGTH);
/// assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
use rand::Rng;

/// Length of a generated API key in characters
pub const API_KEY_LENGTH: usize = 32;

/// Generates a new API key
///
/// Uses base62 characters (A-Z, a-z, 0-9) drawn from `rand::thread_rng()`,
/// giving a key space of 62^32 (roughly 2^190).
pub fn generate_api_key() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..API_KEY_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key_shape() {
        let key = generate_api_key();
        assert_eq!(key.len(), API_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_api_key_randomness() {
        assert_ne!(generate_api_key(), generate_api_key());
    }
}
