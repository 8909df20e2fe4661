use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[cfg(test)]
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Claims minted by the identity provider; only `user_id` is consumed here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    #[serde(default)]
    pub(crate) username: String,
    pub(crate) exp: i64,
}

/// Verifies HS256 bearer tokens issued by the authentication service.
pub(crate) struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    const LEEWAY_SECONDS: u64 = 10;

    pub(crate) fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.key, &self.validation).map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
pub(crate) fn issue_test_token(secret: &str, user_id: i64, ttl_seconds: i64) -> Result<String, JwtError> {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        user_id,
        username: format!("user-{user_id}"),
        exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::Encode)
}

#[cfg(test)]
mod tests {
    use super::{JwtVerifier, issue_test_token};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn verifies_tokens_signed_with_shared_secret() {
        let token = issue_test_token(SECRET, 42, 3600).expect("token must be issued");
        let claims = JwtVerifier::new(SECRET)
            .verify_token(&token)
            .expect("token must verify");
        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let verifier = JwtVerifier::new(SECRET);

        let foreign = issue_test_token("another-secret-another-secret-xx", 42, 3600)
            .expect("token must be issued");
        assert!(verifier.verify_token(&foreign).is_err());

        let expired = issue_test_token(SECRET, 42, -3600).expect("token must be issued");
        assert!(verifier.verify_token(&expired).is_err());
    }
}
