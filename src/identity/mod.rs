//! Credential hashing, stateless bearer tokens and the per-request authorization gate.
//! Handlers only need `authorize`, `make_jwt` and the password pair; the codec is public for tests and tooling.

mod errors;
mod password;
mod token;
mod bearer;
mod authorizer;

pub use errors::AuthError;
pub use password::{hash_password, check_password_hash};
pub use token::{Claims, ClaimsCodec, HmacAlgorithm, HmacCodec, TOKEN_ISSUER, make_jwt, make_jwt_at, validate_jwt, validate_jwt_at};
pub use bearer::get_bearer_token;
pub use authorizer::authorize;
