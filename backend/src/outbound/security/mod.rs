//! Security adapters: bearer token signing and password hashing.
//!
//! Both implement synchronous domain ports. Argon2 hashing is CPU bound; the
//! services call it from request handlers, which is acceptable at the
//! default cost parameters.

mod argon2_password_hasher;
mod jwt_token_codec;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_codec::{JwtSettings, JwtTokenCodec};
