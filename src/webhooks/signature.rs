//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads with a shared secret and delivers the
//! signature in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//! Verification is the first step in webhook processing; invalid signatures
//! are rejected before any parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a signature header (e.g. "sha256=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, wrong algorithm,
/// invalid hex). Never panics.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload with the given secret.
///
/// Mainly useful for generating expected signatures in tests.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value (`sha256=<hex>`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a webhook signature against the payload and secret.
///
/// Uses constant-time comparison (via the HMAC library) to prevent timing
/// attacks. Returns false for malformed headers rather than erroring.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected_signature = match parse_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&expected_signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_signature_verifies() {
        let payload = b"{\"action\":\"submitted\"}";
        let secret = b"hunter2";

        let sig = compute_signature(payload, secret);
        let header = format_signature_header(&sig);

        assert!(verify_signature(payload, &header, secret));
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = b"payload";
        let sig = compute_signature(payload, b"secret-a");
        let header = format_signature_header(&sig);

        assert!(!verify_signature(payload, &header, b"secret-b"));
    }

    #[test]
    fn tampered_payload_fails() {
        let secret = b"secret";
        let sig = compute_signature(b"original", secret);
        let header = format_signature_header(&sig);

        assert!(!verify_signature(b"tampered", &header, secret));
    }

    #[test]
    fn malformed_headers_fail_closed() {
        let payload = b"payload";
        let secret = b"secret";

        assert!(!verify_signature(payload, "", secret));
        assert!(!verify_signature(payload, "abcd1234", secret));
        assert!(!verify_signature(payload, "sha1=abcd1234", secret));
        assert!(!verify_signature(payload, "sha256=not-hex", secret));
    }

    #[test]
    fn parse_signature_header_decodes_hex() {
        assert_eq!(
            parse_signature_header("sha256=1234abcd"),
            Some(vec![0x12, 0x34, 0xab, 0xcd])
        );
        assert_eq!(parse_signature_header("1234abcd"), None);
    }
}
