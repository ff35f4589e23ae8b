//! Bearer tokens: `base64url(payload) "." base64url(HMAC-SHA256(secret, payload))`.
//!
//! The payload is the JSON object `{"sub": <subject>, "iat": <unix seconds>}`.
//! There is no header, so the algorithm cannot be negotiated by the bearer.
//! Tokens do not expire and there is no revocation list; a token is valid as
//! long as its signature recomputes under the process secret.

use base64::{DecodeError, Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;
use time::OffsetDateTime;

use crate::app_error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Why a presented token was rejected.
///
/// All three map to the same 401 response; the distinction is for logs and tests.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("invalid token payload")]
    InvalidPayload,
}

// Field order here is the serialized key order.
#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    iat: i64,
}

#[derive(Debug)]
pub struct TokenCodec {
    secret: SecretString,
}

impl TokenCodec {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Issue a token for an already-normalized subject, stamped with the current time.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        self.issue_at(subject, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn issue_at(&self, subject: &str, iat: i64) -> AppResult<String> {
        if subject.is_empty() {
            return Err(AppError::Internal("token subject must not be empty".into()));
        }
        let raw = serde_json::to_vec(&Claims { sub: subject, iat })
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&raw),
            URL_SAFE_NO_PAD.encode(self.sign(&raw))
        ))
    }

    /// Check the signature and return the embedded subject.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenError::MalformedToken)?;
        if signature_b64.contains('.') {
            return Err(TokenError::MalformedToken);
        }

        let raw = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::MalformedToken)?;
        let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
            Ok(bytes) => bytes,
            // Well-formed alphabet but non-zero trailing bits: no digest encodes to this.
            Err(DecodeError::InvalidLastSymbol(..)) => return Err(TokenError::InvalidSignature),
            Err(_) => return Err(TokenError::MalformedToken),
        };

        // verify_slice compares in constant time.
        self.mac(&raw)
            .verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: serde_json::Map<String, Value> =
            serde_json::from_slice(&raw).map_err(|_| TokenError::InvalidPayload)?;
        match claims.get("sub") {
            Some(Value::String(sub)) => Ok(sub.clone()),
            _ => Err(TokenError::InvalidPayload),
        }
    }

    fn mac(&self, raw: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(raw);
        mac
    }

    fn sign(&self, raw: &[u8]) -> Vec<u8> {
        self.mac(raw).finalize().into_bytes().to_vec()
    }
}
