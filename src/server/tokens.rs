//! Signed session tokens.
//!
//! Tokens use the compact `header.payload.signature` layout with base64url
//! segments and an HMAC-SHA256 signature (HS256). Verification is stateless:
//! a token stays valid until its `exp` regardless of logout.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed lifetime of a session token in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Shortest secret accepted for signing.
pub const MIN_SECRET_LEN: usize = 8;

const ALGORITHM: &str = "HS256";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("invalid signing key")]
    InvalidKey,
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Identity claim carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expires at, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Fails with [`TokenError::InvalidKey`] for secrets shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::InvalidKey);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Creates a service with 32 random bytes as its secret.
    ///
    /// Tokens issued by it become invalid when the process exits.
    pub fn with_random_secret() -> Result<Self, TokenError> {
        let mut secret = [0u8; 32];
        rand::rng().fill(&mut secret);
        Self::new(&secret)
    }

    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, Utc::now())
    }

    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = self.sign(&signing_input);

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks the signature, then the expiry. A token is expired from the
    /// second its `exp` is reached.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let decoded_header: Header = decode_segment(header)?;
        if decoded_header.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, signing_input: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
