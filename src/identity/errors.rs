use thiserror::Error;

/// Why a credential or token was refused.
///
/// Variants stay distinct for logs and tests; `AppError` flattens all of the
/// header and token cases into one client-facing 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header not present")]
    MissingAuthorization,
    #[error("authorization header must use the 'Bearer {{token}}' format")]
    WrongScheme,
    #[error("authorization header must have exactly two parts")]
    MalformedAuthorization,
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("unexpected signing method: {0}")]
    UnexpectedAlgorithm(String),
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token issued by {0:?}, not this service")]
    InvalidIssuer(String),
    #[error("token subject is not a user id: {0}")]
    InvalidSubject(String),
    #[error("token subject has no account: {0}")]
    UnknownSubject(uuid::Uuid),
    #[error("password does not match")]
    PasswordMismatch,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Faults of our own making (500), as opposed to a rejected caller (401).
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Hashing(_) | AuthError::Signing(_))
    }
}
