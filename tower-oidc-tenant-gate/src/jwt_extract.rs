use http::{header::AUTHORIZATION, HeaderMap};

use crate::{error::AuthError, jwt_unverified::UnverifiedJwt};

pub trait JwtExtractor {
    fn extract_jwt(&self, headers: &HeaderMap) -> Result<UnverifiedJwt, AuthError>;
}

/// Reads the token from `Authorization: Bearer <token>`.
pub struct BearerTokenJwtExtractor;

impl JwtExtractor for BearerTokenJwtExtractor {
    fn extract_jwt(&self, headers: &HeaderMap) -> Result<UnverifiedJwt, AuthError> {
        let token = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorizationHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthorizationHeader)?
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::InvalidAuthorizationHeader)?;
        Ok(UnverifiedJwt::new(token))
    }
}
