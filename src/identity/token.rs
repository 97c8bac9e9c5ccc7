//! Stateless identity tokens.
//!
//! Tokens use the compact JWS layout (`header.claims.signature`, each part base64url
//! without padding) and are signed with an HMAC keyed by the shared secret. Nothing is
//! stored server side: validity is a pure function of the token, the secret and the clock.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};
use uuid::Uuid;

use super::AuthError;

/// Issuer stamped into every token.
pub const TOKEN_ISSUER: &str = "chirpy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expires-at, Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// The symmetric MAC family accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    HS256,
    HS384,
    HS512,
}

impl HmacAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HmacAlgorithm::HS256 => "HS256",
            HmacAlgorithm::HS384 => "HS384",
            HmacAlgorithm::HS512 => "HS512",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HS256" => Some(HmacAlgorithm::HS256),
            "HS384" => Some(HmacAlgorithm::HS384),
            "HS512" => Some(HmacAlgorithm::HS512),
            _ => None,
        }
    }

    fn sign(self, key: &[u8], msg: &[u8]) -> Result<Vec<u8>, AuthError> {
        match self {
            HmacAlgorithm::HS256 => mac_bytes::<Hmac<Sha256>>(key, msg),
            HmacAlgorithm::HS384 => mac_bytes::<Hmac<Sha384>>(key, msg),
            HmacAlgorithm::HS512 => mac_bytes::<Hmac<Sha512>>(key, msg),
        }
    }

    fn verify(self, key: &[u8], msg: &[u8], sig: &[u8]) -> bool {
        match self {
            HmacAlgorithm::HS256 => mac_matches::<Hmac<Sha256>>(key, msg, sig),
            HmacAlgorithm::HS384 => mac_matches::<Hmac<Sha384>>(key, msg, sig),
            HmacAlgorithm::HS512 => mac_matches::<Hmac<Sha512>>(key, msg, sig),
        }
    }
}

fn mac_bytes<M: Mac + KeyInit>(key: &[u8], msg: &[u8]) -> Result<Vec<u8>, AuthError> {
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes().to_vec())
}

// verify_slice compares in constant time.
fn mac_matches<M: Mac + KeyInit>(key: &[u8], msg: &[u8], sig: &[u8]) -> bool {
    match <M as Mac>::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(msg);
            mac.verify_slice(sig).is_ok()
        }
        Err(_) => false,
    }
}

/// Turns claims into a signed token string and back.
///
/// `decode` only proves the token is well formed and signed by us; claim policy
/// (expiry, subject) is applied by [`validate_jwt_at`].
pub trait ClaimsCodec {
    fn encode(&self, claims: &Claims) -> Result<String, AuthError>;
    fn decode(&self, token: &str) -> Result<Claims, AuthError>;
}

pub struct HmacCodec<'a> {
    secret: &'a [u8],
    algorithm: HmacAlgorithm,
}

impl<'a> HmacCodec<'a> {
    /// HS256 keyed by `secret`.
    pub fn new(secret: &'a [u8]) -> Self {
        Self { secret, algorithm: HmacAlgorithm::HS256 }
    }

    pub fn with_algorithm(mut self, algorithm: HmacAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

fn b64_json<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let raw = serde_json::to_vec(value).map_err(|e| AuthError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(raw))
}

fn b64_decode(part: &str, what: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| AuthError::MalformedToken(format!("{what}: {e}")))
}

impl ClaimsCodec for HmacCodec<'_> {
    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = Header { alg: self.algorithm.name().to_string(), typ: Some("JWT".into()) };
        let signing_input = format!("{}.{}", b64_json(&header)?, b64_json(claims)?);
        let sig = self.algorithm.sign(self.secret, signing_input.as_bytes())?;
        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(sig)))
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_b64, claims_b64, sig_b64] = parts.as_slice() else {
            return Err(AuthError::MalformedToken(format!("expected 3 segments, found {}", parts.len())));
        };
        let header: Header = serde_json::from_slice(&b64_decode(header_b64, "header")?)
            .map_err(|e| AuthError::MalformedToken(format!("header: {e}")))?;
        // Refuse anything outside the HMAC family before touching the signature.
        let Some(alg) = HmacAlgorithm::from_name(&header.alg) else {
            return Err(AuthError::UnexpectedAlgorithm(header.alg));
        };
        let sig = b64_decode(sig_b64, "signature")?;
        let signing_input_len = header_b64.len() + 1 + claims_b64.len();
        let signing_input = &token.as_bytes()[..signing_input_len];
        if !alg.verify(self.secret, signing_input, &sig) {
            return Err(AuthError::InvalidSignature);
        }
        serde_json::from_slice(&b64_decode(claims_b64, "claims")?)
            .map_err(|e| AuthError::MalformedToken(format!("claims: {e}")))
    }
}

/// Issue a token for `user_id` that lives for `expires_in` from now.
pub fn make_jwt(user_id: Uuid, secret: &[u8], expires_in: Duration) -> Result<String, AuthError> {
    make_jwt_at(user_id, secret, expires_in, Utc::now())
}

/// [`make_jwt`] with an explicit issue time.
pub fn make_jwt_at(user_id: Uuid, secret: &[u8], expires_in: Duration, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
    let expires_at = issued_at
        .checked_add_signed(expires_in)
        .ok_or_else(|| AuthError::Signing(format!("expiry out of range: {expires_in}")))?;
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };
    HmacCodec::new(secret).encode(&claims)
}

/// Resolve a token to the user id it was issued for.
pub fn validate_jwt(token: &str, secret: &[u8]) -> Result<Uuid, AuthError> {
    validate_jwt_at(token, secret, Utc::now())
}

/// [`validate_jwt`] against an explicit clock reading. A token is dead from the
/// second named in `exp` onwards; there is no leeway.
pub fn validate_jwt_at(token: &str, secret: &[u8], now: DateTime<Utc>) -> Result<Uuid, AuthError> {
    let claims = HmacCodec::new(secret).decode(token)?;
    if now.timestamp() >= claims.exp {
        return Err(AuthError::Expired);
    }
    if claims.iss != TOKEN_ISSUER {
        return Err(AuthError::InvalidIssuer(claims.iss));
    }
    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject(claims.sub))
}
