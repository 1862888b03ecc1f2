use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::Claims;
use crate::{error::AppError, state::AppState};

/// Verification side of the HS256 tokens issued by the identity service.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Authenticated caller, taken from the bearer token subject.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl AuthUser {
    /// Bodies carrying an explicit `userId` must name the token's own user.
    pub fn ensure_owner(&self, claimed: Uuid) -> Result<(), AppError> {
        if self.0 != claimed {
            warn!(token_user = %self.0, body_user = %claimed, "userId does not match token");
            return Err(AppError::Forbidden(
                "userId does not match the authenticated user".into(),
            ));
        }
        Ok(())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(AppError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

#[cfg(test)]
pub fn issue_token(
    cfg: &crate::config::JwtConfig,
    user_id: Uuid,
    ttl: time::Duration,
) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;

    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        iat: now.unix_timestamp() as usize,
        exp: (now + ttl).unix_timestamp() as usize,
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .expect("sign token")
}
