/// JWT identity assertions
///
/// Tokens are minted at registration and login and presented back as
/// `Authorization: Bearer <token>`. They are stateless: nothing is persisted
/// and there is no revocation list, so expiry is the only way a token stops
/// being valid.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Lifetime**: 24 hours from issuance
/// - **Validation**: signature, issuer, `exp` and `nbf`, with no leeway
/// - **Secret**: server-held, at least 32 bytes
///
/// # Example
///
/// ```
/// use todolist_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long");
///
/// let token = tokens.issue_for(42)?;
/// assert_eq!(tokens.validate(&token)?, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "todolist";

/// Token lifetime in hours
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Token is past its expiry
    #[error("Token has expired")]
    Expired,

    /// Bad signature, wrong issuer, or not a JWT at all
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims
///
/// - `sub`: User ID
/// - `iss`: Always [`ISSUER`]
/// - `iat` / `nbf`: Issuance time (Unix seconds)
/// - `exp`: Issuance time plus [`TOKEN_TTL_HOURS`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `user_id` issued at `issued_at`
    pub fn new(user_id: i64, issued_at: DateTime<Utc>) -> Self {
        let expiration = issued_at + Duration::hours(TOKEN_TTL_HOURS);

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

/// Issues and validates signed identity tokens
///
/// Holds the signing keys derived from the server secret. Cheap to clone and
/// read-only after construction.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service signing with `secret`
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        // `sub` is numeric, so its presence is enforced by `Claims` itself
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `user`, valid for 24 hours from now
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_for(user.id)
    }

    /// Issues a token for a user ID, valid for 24 hours from now
    pub fn issue_for(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if minted at `issued_at`
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, issued_at);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Create(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and returns the full claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Validates a token and returns the user ID it was issued for
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired` once 24 hours have passed since issuance
    /// - `TokenError::Invalid` for bad signatures, wrong issuer or malformed input
    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }
}
