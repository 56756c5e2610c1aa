//! Unverified decoding of the bearer token's identity claims.
//!
//! The service issues JWTs whose payload carries display identity (name,
//! email, dietary preference) and an expiry timestamp. The client only
//! decodes the middle segment for display and expiry estimation - signature
//! verification happens server-side on every request.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims carried in the token payload. All fields are optional - a token
/// with a missing claim is still usable, just displayed with blanks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    pub name: Option<String>,
    pub email: Option<String>,
    pub dietary_preference: Option<String>,
    /// Expiry as a unix timestamp in seconds
    pub exp: Option<i64>,
}

impl IdentityClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
/// Fails on anything that is not three dot-separated base64url segments
/// with a JSON object in the middle.
pub fn decode(token: &str) -> Result<IdentityClaims> {
    let mut segments = token.split('.');
    let (_header, payload) = match (segments.next(), segments.next()) {
        (Some(h), Some(p)) if !h.is_empty() && !p.is_empty() => (h, p),
        _ => return Err(anyhow!("Token is not a three-segment JWT")),
    };
    if segments.next().is_none() {
        return Err(anyhow!("Token is not a three-segment JWT"));
    }

    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("Token payload is not valid base64url")?;

    serde_json::from_slice(&decoded).context("Token payload is not a JSON claims object")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decode_full_claims() {
        let token = encode_token(
            r#"{"name":"Ada Lovelace","email":"ada@example.com",
                "dietary_preference":"veg","exp":1767225600}"#,
        );
        let claims = decode(&token).unwrap();
        assert_eq!(claims.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert_eq!(claims.dietary_preference.as_deref(), Some("veg"));
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_decode_minimal_claims() {
        let token = encode_token(r#"{"email":"ada@example.com"}"#);
        let claims = decode(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert!(claims.name.is_none());
        assert!(claims.exp.is_none());
        assert!(claims.expires_at().is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        assert!(decode("").is_err());
        assert!(decode("not-a-jwt").is_err());
        assert!(decode("only.two").is_err());
        // Payload is not base64
        assert!(decode("aGVhZGVy.!!!.c2ln").is_err());
        // Payload decodes but is not JSON
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(decode(&not_json).is_err());
    }

    #[test]
    fn test_decode_tolerates_padded_payload() {
        // Some encoders emit padded base64; trailing '=' must not break decode
        let header = URL_SAFE_NO_PAD.encode("{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(r#"{"name":"Bo"}"#);
        let token = format!("{}.{}.sig", header, body);
        let claims = decode(&token).unwrap();
        assert_eq!(claims.name.as_deref(), Some("Bo"));
    }
}
