use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::state::AppState;

/// JWT payload; the id is the user's ObjectId in hex. Tokens carry no
/// expiry claim and none is enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub iat: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn sign(&self, id: &ObjectId, username: &str) -> anyhow::Result<String> {
        let claims = Claims {
            id: id.to_hex(),
            username: username.to_string(),
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %claims.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.config.jwt_secret.as_bytes())
    }
}

/// The original clients send `Authorization: JWT <token>`; plain Bearer is
/// accepted as well.
pub(crate) fn strip_scheme(header: &str) -> Option<&str> {
    header
        .strip_prefix("JWT ")
        .or_else(|| header.strip_prefix("Bearer "))
}

/// Extracts and validates the bearer token, yielding the caller's identity.
#[derive(Debug)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = strip_scheme(auth_header).ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header".to_string(),
        ))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid token");
                return Err((StatusCode::UNAUTHORIZED, "Invalid token".to_string()));
            }
        };

        let id = ObjectId::parse_str(&claims.id)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token".to_string()))?;

        Ok(AuthUser {
            id,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        // Also proves tokens without an expiry claim verify cleanly.
        let keys = make_keys();
        let id = ObjectId::new();
        let token = keys.sign(&id, "alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, id.to_hex());
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn verify_rejects_a_token_signed_with_another_secret() {
        let keys = make_keys();
        let other = JwtKeys::new(b"some-other-secret");
        let token = other.sign(&ObjectId::new(), "alice").expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn strip_scheme_accepts_jwt_and_bearer() {
        assert_eq!(strip_scheme("JWT abc"), Some("abc"));
        assert_eq!(strip_scheme("Bearer abc"), Some("abc"));
        assert_eq!(strip_scheme("Basic abc"), None);
        assert_eq!(strip_scheme("abc"), None);
    }
}
