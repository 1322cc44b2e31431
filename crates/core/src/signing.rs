//! Detached payload signatures.
//!
//! Payloads are signed with RSASSA-PKCS1-v1_5 over a SHA-256 digest using a
//! PEM-encoded RSA private key (PKCS#8 `PRIVATE KEY` or PKCS#1
//! `RSA PRIVATE KEY`). The receiving endpoint verifies with the matching
//! public key, distributed out of band.
//!
//! Signing is best-effort: [`sign`] never fails, it returns `None` and the
//! caller sends the payload unsigned.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// HTTP header carrying the base64-encoded signature.
pub const SIGNATURE_HEADER: &str = "X-Event-Stream-Signature";

/// Error type for signing and verification failures.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The key material is not UTF-8 PEM or not an RSA key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The signature primitive itself failed.
    #[error("Signing failed: {0}")]
    Sign(String),

    /// The header value is not valid base64 or not a well-formed signature.
    #[error("Malformed signature: {0}")]
    Malformed(String),

    /// The signature does not match the body under the given public key.
    #[error("Signature verification failed")]
    Mismatch,
}

/// Sign `payload` with `key`, or return `None`.
///
/// `None` is returned when no key is configured (absent or blank) and when
/// signing fails for any reason. Both mean "deliver unsigned".
pub fn sign(payload: &[u8], key: Option<&[u8]>) -> Option<Vec<u8>> {
    let key = key.filter(|k| !k.iter().all(u8::is_ascii_whitespace))?;
    match try_sign(payload, key) {
        Ok(signature) => Some(signature),
        Err(e) => {
            tracing::debug!(error = %e, "Payload signing failed, delivering unsigned");
            None
        }
    }
}

/// Sign `payload` with a PEM private key, reporting why signing failed.
pub fn try_sign(payload: &[u8], key_pem: &[u8]) -> Result<Vec<u8>, SigningError> {
    let private_key = parse_private_key(key_pem)?;
    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key
        .try_sign(payload)
        .map_err(|e| SigningError::Sign(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Base64 (standard alphabet, padded) encoding used for the header value.
pub fn encode_signature(signature: &[u8]) -> String {
    STANDARD.encode(signature)
}

/// Verify a signature header value against the exact received body.
///
/// Accepts an SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
pub fn verify_signature(
    public_key_pem: &str,
    body: &[u8],
    header_value: &str,
) -> Result<(), SigningError> {
    let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_key_pem))
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;

    let raw = STANDARD
        .decode(header_value.trim())
        .map_err(|e| SigningError::Malformed(e.to_string()))?;
    let signature =
        Signature::try_from(raw.as_slice()).map_err(|e| SigningError::Malformed(e.to_string()))?;

    VerifyingKey::<Sha256>::new(public_key)
        .verify(body, &signature)
        .map_err(|_| SigningError::Mismatch)
}

fn parse_private_key(key_pem: &[u8]) -> Result<RsaPrivateKey, SigningError> {
    let pem = std::str::from_utf8(key_pem)
        .map_err(|_| SigningError::InvalidKey("key is not UTF-8 PEM".into()))?
        .trim();

    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| SigningError::InvalidKey(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
