use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;

pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_different_salt_yields_different_digest() {
        let first = hash_password("123456", &generate_salt());
        let second = hash_password("123456", &generate_salt());
        assert_ne!(first, second);
    }

    #[test]
    fn verify_round_trip() {
        let salt = generate_salt();
        let digest = hash_password("secreto", &salt);

        assert!(verify_password("secreto", &salt, &digest));
        assert!(!verify_password("secret0", &salt, &digest));
    }
}
