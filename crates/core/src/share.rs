use rand::distributions::Alphanumeric;
use rand::Rng;

/// 32 alphanumeric characters, ~190 bits of entropy. Collisions are not
/// expected in practice; the persistence layer still retries against the
/// global unique index until the token is unused.
pub const SHARE_TOKEN_LEN: usize = 32;

/// Mint a URL-safe share token from the thread-local CSPRNG.
pub fn mint_share_token() -> String {
    let mut rng = rand::thread_rng();
    (&mut rng).sample_iter(Alphanumeric).take(SHARE_TOKEN_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::{mint_share_token, SHARE_TOKEN_LEN};

    #[test]
    fn tokens_are_url_safe_and_fixed_length() {
        let token = mint_share_token();
        assert_eq!(token.len(), SHARE_TOKEN_LEN);
        assert!(token.chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(mint_share_token(), mint_share_token());
    }
}
