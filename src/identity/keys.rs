use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

/// Derived password hash, zeroed on drop
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct PasswordHash {
    bytes: [u8; HASH_LENGTH],
}

impl PasswordHash {
    /// Derive from password + salt using PBKDF2-SHA256
    pub fn derive(password: &str, salt: &[u8], iterations: u32) -> Self {
        let mut bytes = [0u8; HASH_LENGTH];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut bytes);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.bytes
    }

    /// Constant-time comparison against a stored hash.
    pub fn matches(&self, stored: &[u8]) -> bool {
        stored.len() == HASH_LENGTH && bool::from(self.bytes[..].ct_eq(stored))
    }
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn derive_produces_deterministic_hash() {
        let salt = [42u8; SALT_LENGTH];
        let h1 = PasswordHash::derive("password", &salt, FAST);
        let h2 = PasswordHash::derive("password", &salt, FAST);
        assert_eq!(h1.as_bytes(), h2.as_bytes());
        assert!(h1.matches(h2.as_bytes()));
    }

    #[test]
    fn different_passwords_produce_different_hashes() {
        let salt = [42u8; SALT_LENGTH];
        let h1 = PasswordHash::derive("password1", &salt, FAST);
        let h2 = PasswordHash::derive("password2", &salt, FAST);
        assert!(!h1.matches(h2.as_bytes()));
    }

    #[test]
    fn different_salts_produce_different_hashes() {
        let h1 = PasswordHash::derive("password", &[1u8; SALT_LENGTH], FAST);
        let h2 = PasswordHash::derive("password", &[2u8; SALT_LENGTH], FAST);
        assert_ne!(h1.as_bytes(), h2.as_bytes());
    }

    #[test]
    fn truncated_hash_never_matches() {
        let h = PasswordHash::derive("password", &[7u8; SALT_LENGTH], FAST);
        assert!(!h.matches(&h.as_bytes()[..16]));
    }

    #[test]
    fn generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
