use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::services::auth::claims::{ClaimsError, ClaimsParser, Principal};

/// Decoded payload of a verified token, in claim order.
pub type TokenClaims = Map<String, Value>;

// Errors returned by token verification + principal resolution.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token carries no team grants")]
    MissingGrants,
    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

/// HMAC access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
    parser: ClaimsParser,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .field("parser", &self.parser)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        issuer: Option<&str>,
        audience: Option<&str>,
        leeway_seconds: u64,
        parser: ClaimsParser,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.set_required_spec_claims(&["exp", "aud"]);
            }
            // Legacy tokens may carry an `aud` we know nothing about.
            None => validation.validate_aud = false,
        }
        validation.leeway = leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            parser,
        }
    }

    /// Signature + `exp` (and `iss`/`aud` when configured).
    pub fn verify(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify, then derive the active team for this request.
    ///
    /// This is the entry-point for middleware.
    pub fn resolve_principal(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = self.verify(token)?;
        let scoped = self
            .parser
            .scoped_claims(&claims)
            .ok_or(TokenError::MissingGrants)?;

        let grants = self.parser.parse(scoped)?;
        Ok(grants.effective_principal())
    }
}
