//! `X-Hub-Signature` verification
//!
//! The platform signs every webhook POST with HMAC-SHA1 over the raw body,
//! keyed by the app secret, and sends it as `sha1=<hex>`.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

const PREFIX: &str = "sha1=";

/// Check a `sha1=<hex>` header value against the raw request body
///
/// Returns `false` for a missing prefix, bad hex or a digest mismatch. The
/// digests are compared in constant time.
#[must_use]
pub fn verify_signature(signature_header: &str, payload: &[u8], app_secret: &str) -> bool {
    let Some(signature_hex) = signature_header.strip_prefix(PREFIX) else {
        tracing::warn!("signature header is missing the sha1= prefix");
        return false;
    };

    let expected = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::warn!(error = %e, "signature is not valid hex");
            return false;
        }
    };

    let computed = match digest(payload, app_secret) {
        Ok(computed) => computed,
        Err(e) => {
            tracing::error!(error = %e, "failed to create HMAC instance");
            return false;
        }
    };

    let valid: bool = computed.as_slice().ct_eq(&expected).into();
    if !valid {
        tracing::warn!("webhook signature mismatch");
    }
    valid
}

/// Compute the `X-Hub-Signature` header value for a body
///
/// # Errors
///
/// Returns [`InvalidLength`] if the HMAC rejects the key.
pub fn sign(payload: &[u8], app_secret: &str) -> Result<String, InvalidLength> {
    let computed = digest(payload, app_secret)?;
    Ok(format!("{PREFIX}{}", hex::encode(computed)))
}

fn digest(payload: &[u8], app_secret: &str) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(app_secret.as_bytes())?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"object":"page","entry":[]}"#;
    const SECRET: &str = "test_secret";

    #[test]
    fn valid_signature() {
        let header = sign(BODY, SECRET).unwrap();
        assert!(header.starts_with("sha1="));
        assert_eq!(header.len(), PREFIX.len() + 40);
        assert!(verify_signature(&header, BODY, SECRET));
    }

    #[test]
    fn known_digest() {
        // HMAC-SHA1("key", "The quick brown fox jumps over the lazy dog")
        let header = "sha1=de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9";
        assert!(verify_signature(
            header,
            b"The quick brown fox jumps over the lazy dog",
            "key"
        ));
    }

    #[test]
    fn wrong_secret() {
        let header = sign(BODY, "wrong_secret").unwrap();
        assert!(!verify_signature(&header, BODY, SECRET));
    }

    #[test]
    fn tampered_payload() {
        let header = sign(BODY, SECRET).unwrap();
        assert!(!verify_signature(&header, br#"{"object":"user"}"#, SECRET));
    }

    #[test]
    fn missing_prefix() {
        let header = sign(BODY, SECRET).unwrap();
        let bare = header.trim_start_matches(PREFIX);
        assert!(!verify_signature(bare, BODY, SECRET));
        assert!(!verify_signature(&format!("sha256={bare}"), BODY, SECRET));
    }

    #[test]
    fn empty_secret_still_signs() {
        let header = sign(BODY, "").unwrap();
        assert!(verify_signature(&header, BODY, ""));
        assert!(!verify_signature(&header, BODY, SECRET));
    }

    #[test]
    fn invalid_hex_or_length() {
        assert!(!verify_signature("sha1=zzzz", BODY, SECRET));
        assert!(!verify_signature("sha1=abcd", BODY, SECRET));
        assert!(!verify_signature("sha1=", BODY, SECRET));
    }
}
