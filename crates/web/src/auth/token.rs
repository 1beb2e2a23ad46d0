//! Signed-token verification.
//!
//! Credentials are HS256 JWTs signed with the process-wide secret. Claims
//! come out exactly as encoded; no normalization and no store lookup happen
//! at this layer.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use pvegate_common::Role;

/// Decoded claims of a verified credential.
///
/// Never constructed from untrusted input; the only producer is
/// [`TokenCodec::verify`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity the credential was issued to
    pub identity: String,
    pub role: Role,
    pub division: String,
    /// Expiry (unix seconds). Validated when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Verifies and (for token issuers and tests) signs credentials.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the configured signing secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced when the credential carries an `exp` claim, but
        // tokens without one are accepted.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw credential and decode its claims.
    ///
    /// Fails on bad signature, structural garbage, or expiry. Never returns
    /// partial claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Sign a set of claims with the configured secret.
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }
}
