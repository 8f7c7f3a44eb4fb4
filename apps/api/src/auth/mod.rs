//! Account registration, login and bearer-token authentication.
//!
//! Passwords are stored as Argon2id PHC strings. Sessions are stateless HS256
//! JWTs; handlers that act on behalf of a user take an `AuthUser` extractor
//! and never trust a user id supplied in the request body or query.

pub mod handlers;
pub mod password;
pub mod store;
pub mod token;

pub use token::AuthUser;
