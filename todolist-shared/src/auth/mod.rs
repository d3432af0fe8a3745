/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed, 24-hour identity tokens
/// - [`middleware`]: Bearer header parsing and per-request identity
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, salted, plaintext never stored
/// - **JWT Tokens**: HS256, fixed 24-hour expiry, no refresh or revocation
/// - **Constant-time Comparison**: password verification via `argon2`

pub mod jwt;
pub mod middleware;
pub mod password;
