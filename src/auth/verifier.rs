//! Code verifier generation for the authorization-code flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::error::AuthError;

/// Length of every generated verifier, the maximum RFC 7636 allows.
pub const VERIFIER_LEN: usize = 128;

/// Produces code verifiers for a session; [`generate_verifier`] by default.
pub type VerifierSource = fn() -> Result<String, AuthError>;

// 100 bytes encode to 134 URL-safe characters, enough to truncate to 128.
const ENTROPY_BYTES: usize = 100;

/// Generate a URL-safe code verifier of exactly [`VERIFIER_LEN`] characters.
///
/// Bytes come from the operating system's CSPRNG; if it cannot be read the
/// error is [`AuthError::SecretGenerationFailed`].
pub fn generate_verifier() -> Result<String, AuthError> {
    let mut random = [0u8; ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|e| AuthError::SecretGenerationFailed(e.to_string()))?;
    let mut verifier = URL_SAFE_NO_PAD.encode(random);
    verifier.truncate(VERIFIER_LEN);
    Ok(verifier)
}
