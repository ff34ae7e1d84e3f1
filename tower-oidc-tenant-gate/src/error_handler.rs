use http::{
    header::{LOCATION, WWW_AUTHENTICATE},
    HeaderValue, Response, StatusCode,
};

use crate::error::{AuthError, StartupError};

/// Turns a failed authentication into the response sent to the client.
///
/// The inner service is never called for these requests.
pub trait ErrorHandler<B>: Send + Sync {
    fn map_error(&self, error: AuthError) -> Response<B>;
}

/// Answers `401 Unauthorized` with an empty body, adding
/// `WWW-Authenticate: Bearer` when no usable credentials were sent.
pub struct DefaultErrorHandler;

impl<B> ErrorHandler<B> for DefaultErrorHandler
where
    B: Default,
{
    fn map_error(&self, error: AuthError) -> Response<B> {
        let mut response = Response::new(B::default());
        *response.status_mut() = StatusCode::UNAUTHORIZED;
        if error.is_missing_credentials() {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Body sent when a token was presented but rejected.
pub const SIGN_IN_FAILED: &str = "Sign-in failed.";

/// Sends unauthenticated browsers to a sign-in page.
///
/// Requests without credentials get `302 Found` to the sign-in URL.
/// Requests whose token was rejected, including tokens from a tenant that
/// is not accepted, get `401` with a generic [SIGN_IN_FAILED] body; the
/// reason is not disclosed.
pub struct SignInRedirectErrorHandler {
    sign_in_url: HeaderValue,
}

impl SignInRedirectErrorHandler {
    pub fn new(sign_in_url: &str) -> Result<Self, StartupError> {
        let sign_in_url = HeaderValue::from_str(sign_in_url).map_err(|_| {
            StartupError::InvalidParameter(format!("Invalid sign-in URL: {}", sign_in_url))
        })?;
        Ok(Self { sign_in_url })
    }
}

impl<B> ErrorHandler<B> for SignInRedirectErrorHandler
where
    B: Default + From<&'static str>,
{
    fn map_error(&self, error: AuthError) -> Response<B> {
        if error.is_missing_credentials() {
            let mut response = Response::new(B::default());
            *response.status_mut() = StatusCode::FOUND;
            response
                .headers_mut()
                .insert(LOCATION, self.sign_in_url.clone());
            response
        } else {
            let mut response = Response::new(B::from(SIGN_IN_FAILED));
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::InvalidIssuer;

    #[test]
    fn default_challenges_missing_credentials() {
        let response: Response<String> =
            DefaultErrorHandler.map_error(AuthError::MissingAuthorizationHeader);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[test]
    fn default_rejects_foreign_tenant_without_challenge() {
        let response: Response<String> = DefaultErrorHandler
            .map_error(InvalidIssuer::new("https://login.microsoftonline.com/x/v2.0").into());

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
        assert!(response.body().is_empty());
    }

    #[test]
    fn redirect_when_not_signed_in() {
        let handler = SignInRedirectErrorHandler::new("/signin").unwrap();
        let response: Response<String> =
            handler.map_error(AuthError::InvalidAuthorizationHeader);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/signin");
    }

    #[test]
    fn generic_page_for_foreign_tenant() {
        let handler = SignInRedirectErrorHandler::new("/signin").unwrap();
        let response: Response<String> =
            handler.map_error(InvalidIssuer::new("https://login.microsoftonline.com/x/v2.0").into());

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.body(), SIGN_IN_FAILED);
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[test]
    fn sign_in_url_must_be_header_safe() {
        assert!(SignInRedirectErrorHandler::new("/sign\nin").is_err());
    }
}
