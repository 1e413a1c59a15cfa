//! HMAC-signed session tokens: `v1.<payload>.<sig>`, base64url without
//! padding over the serialized session record.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use nocap_model::AuthSession;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;
const TOKEN_VERSION_V1: &str = "v1";
const MAX_TOKEN_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionErrorCode {
    InvalidFormat,
    UnsupportedVersion,
    InvalidSignature,
    InvalidPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub code: SessionErrorCode,
    pub message: String,
}

impl SessionError {
    #[must_use]
    pub fn new(code: SessionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for SessionError {}

pub fn issue_token(session: &AuthSession, secret: &[u8]) -> Result<String, SessionError> {
    let payload_bytes = serde_json::to_vec(session)
        .map_err(|e| SessionError::new(SessionErrorCode::InvalidPayload, e.to_string()))?;
    let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SessionError::new(SessionErrorCode::InvalidPayload, e.to_string()))?;
    mac.update(payload_part.as_bytes());
    let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{TOKEN_VERSION_V1}.{payload_part}.{sig_part}"))
}

pub fn verify_token(token: &str, secret: &[u8]) -> Result<AuthSession, SessionError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(SessionError::new(
            SessionErrorCode::InvalidFormat,
            "token exceeds max length",
        ));
    }
    let parts: Vec<&str> = token.split('.').collect();
    let (payload_part, sig_part) = match parts.as_slice() {
        [version, payload, sig] if *version == TOKEN_VERSION_V1 => (*payload, *sig),
        [version, _, _] => {
            return Err(SessionError::new(
                SessionErrorCode::UnsupportedVersion,
                format!("unsupported token version: {version}"),
            ))
        }
        _ => {
            return Err(SessionError::new(
                SessionErrorCode::InvalidFormat,
                "invalid token format",
            ))
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SessionError::new(SessionErrorCode::InvalidPayload, e.to_string()))?;
    mac.update(payload_part.as_bytes());
    let expected = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|e| SessionError::new(SessionErrorCode::InvalidFormat, e.to_string()))?;
    mac.verify_slice(&expected).map_err(|_| {
        SessionError::new(SessionErrorCode::InvalidSignature, "token signature mismatch")
    })?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_part)
        .map_err(|e| SessionError::new(SessionErrorCode::InvalidFormat, e.to_string()))?;
    serde_json::from_slice(&payload_bytes)
        .map_err(|e| SessionError::new(SessionErrorCode::InvalidPayload, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocap_model::{UserRole, Wallet};
    use time::macros::datetime;

    fn session() -> AuthSession {
        AuthSession {
            is_authenticated: true,
            wallet: Some(Wallet {
                address: "0x00112233445566778899aabbccddeeff00112233".to_string(),
                short_address: "0x0011...2233".to_string(),
                provider: "wallet".to_string(),
            }),
            role: UserRole::Founder,
            issued_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    #[test]
    fn token_round_trips() {
        let token = issue_token(&session(), b"secret").expect("issue");
        let back = verify_token(&token, b"secret").expect("verify");
        assert_eq!(back, session());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue_token(&session(), b"secret").expect("issue");
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = URL_SAFE_NO_PAD.encode(b"{\"is_authenticated\":true}");
        let forged = parts.join(".");
        let err = verify_token(&forged, b"secret").expect_err("forged");
        assert_eq!(err.code, SessionErrorCode::InvalidSignature);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&session(), b"secret").expect("issue");
        let err = verify_token(&token, b"other-secret").expect_err("wrong secret");
        assert_eq!(err.code, SessionErrorCode::InvalidSignature);
    }

    #[test]
    fn garbage_token_is_invalid_format() {
        let err = verify_token("not-a-token", b"secret").expect_err("garbage");
        assert_eq!(err.code, SessionErrorCode::InvalidFormat);
    }

    #[test]
    fn future_version_is_unsupported() {
        let token = issue_token(&session(), b"secret").expect("issue");
        let swapped = token.replacen("v1.", "v9.", 1);
        let err = verify_token(&swapped, b"secret").expect_err("version");
        assert_eq!(err.code, SessionErrorCode::UnsupportedVersion);
    }
}
