//! Legacy password digest.

use md5::{Digest, Md5};

/// Static salt mixed into every digest. Part of the stored-credential
/// format: changing it invalidates every existing account.
const SALT: &str = "u&n3@jah*HHsi1";

/// Digests a plaintext password for storage and credential comparison.
///
/// This is the historical scheme the stored credentials use: one MD5 pass
/// over a static salt plus the plaintext, rendered as lowercase hex. It is
/// not an adaptive password hash and has no per-user salt, so treat it as a
/// compatibility obligation rather than a security boundary. New
/// deployments without legacy credentials should swap in a modern scheme
/// such as argon2 before accepting real users.
#[must_use]
pub fn encrypt_password(password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(SALT.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
