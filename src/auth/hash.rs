//! Login hash and password hashing

use base64::Engine;
use rand::distr::Alphanumeric;
use rand::Rng;
use sha1::{Digest, Sha1};
use sha2::Sha256;

const PASSWORD_ITERATIONS: u32 = 10_000;
const PASSWORD_KEY_LENGTH: usize = 32;

/// Compute the session validation token for a login at `timestamp`
///
/// The token is `hex(sha1(salt || login_id || timestamp))` with the timestamp
/// written in decimal.
pub fn login_hash(salt: &str, login_id: &str, timestamp: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(salt.as_bytes());
    hasher.update(login_id.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash a plain password the way it is stored in the password column
///
/// `base64(pbkdf2_hmac_sha256(password, salt, 10000, 32))`. Lookups compare
/// this value with the stored one directly, so the output must be
/// deterministic for a given salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut key = [0u8; PASSWORD_KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PASSWORD_ITERATIONS,
        &mut key,
    );
    base64::engine::general_purpose::STANDARD.encode(key)
}

/// Random alphanumeric string for salts
pub fn generate_salt(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
