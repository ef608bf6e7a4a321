//! Token verification.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued for.
    pub username: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
}

/// Resolves an opaque connection token to an identity.
///
/// Implementations return the authenticated username, or None when the
/// token is missing, invalid or expired.
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and return the identity it was issued for.
    fn verify(&self, token: &str) -> Option<String>;
}

/// JWT-backed token verifier.
///
/// Verifies HS256 tokens signed with the secret shared with the login
/// service. Expiration is validated.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a new verifier from a secret key.
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key,
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Option<String> {
        if token.is_empty() {
            return None;
        }

        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.username),
            Err(e) => {
                tracing::debug!("token verification failed: {}", e);
                None
            }
        }
    }
}
