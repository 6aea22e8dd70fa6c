//! PBKDF2-HMAC-SHA256 password digests.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt_hex>$<digest_hex>`.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_BYTES: usize = 16;
const DEFAULT_ITERATIONS: u32 = 100_000;

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = derive(password.as_bytes(), &salt, DEFAULT_ITERATIONS);
    format!(
        "{SCHEME}${DEFAULT_ITERATIONS}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Checks `password` against a stored digest.
///
/// Malformed stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = derive(password.as_bytes(), &salt, iterations);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

/// One PBKDF2 output block, which is the full 32-byte key.
fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let prf = HmacSha256::new_from_slice(password).expect("HMAC accepts keys of any length");

    let mut block: [u8; 32] = prf
        .clone()
        .chain_update(salt)
        .chain_update(1u32.to_be_bytes())
        .finalize()
        .into_bytes()
        .into();
    let mut key = block;
    for _ in 1..iterations {
        block = prf.clone().chain_update(block).finalize().into_bytes().into();
        for (out, byte) in key.iter_mut().zip(block) {
            *out ^= byte;
        }
    }
    key
}
