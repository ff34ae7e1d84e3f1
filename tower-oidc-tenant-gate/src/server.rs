use core::fmt;
use std::sync::Arc;

use http::Request;
use log::debug;
use serde::de::DeserializeOwned;

use crate::{
    authorizer::token_authorizer::Authorizer,
    claims::DefaultClaims,
    error::AuthError,
    error_handler::{DefaultErrorHandler, ErrorHandler},
    jwt_extract::{BearerTokenJwtExtractor, JwtExtractor},
    layer::OidcTenantGateLayer,
    provider::ProviderConfiguration,
};

/// OidcTenantGate
///
/// This is the actual middleware.
/// May be turned into a tower layer by calling [into_layer](OidcTenantGate::into_layer).
#[derive(Clone)]
pub struct OidcTenantGate<Claims = DefaultClaims> {
    authorizer: Authorizer<Claims>,
    jwt_extractor: Arc<dyn JwtExtractor + Send + Sync>,
}

impl<Claims> OidcTenantGate<Claims>
where
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) async fn new(provider: ProviderConfiguration) -> OidcTenantGate<Claims> {
        OidcTenantGate {
            authorizer: Authorizer::new(provider).await,
            jwt_extractor: Arc::new(BearerTokenJwtExtractor),
        }
    }

    /// Validate the request's token. On success the claims are
    /// inserted into the request extensions.
    pub(crate) fn authorize_request<Body>(
        &self,
        mut request: Request<Body>,
    ) -> Result<Request<Body>, AuthError> {
        let token = match self.jwt_extractor.extract_jwt(request.headers()) {
            Ok(token) => token,
            Err(e) => {
                debug!("JWT extraction failed: {}", e);
                return Err(e);
            }
        };
        match self.authorizer.validate(&token) {
            Ok(claims) => {
                debug!("JWT validation successful ({})", self.authorizer.identifier());
                request.extensions_mut().insert(claims);
                Ok(request)
            }
            Err(e) => {
                debug!(
                    "JWT validation failed ({}) : {}",
                    self.authorizer.identifier(),
                    e
                );
                Err(e)
            }
        }
    }
}

impl<Claims> fmt::Debug for OidcTenantGate<Claims> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcTenantGate")
            .field("provider", &self.authorizer.identifier())
            .finish()
    }
}

impl<Claims> OidcTenantGate<Claims>
where
    Claims: Clone,
{
    /// Returns a [tower layer](https://docs.rs/tower/latest/tower/trait.Layer.html).
    pub fn into_layer<ResBody>(&self) -> OidcTenantGateLayer<ResBody, Claims>
    where
        ResBody: Default,
    {
        OidcTenantGateLayer::new(self.clone(), Arc::new(DefaultErrorHandler))
    }

    /// Returns a [tower layer](https://docs.rs/tower/latest/tower/trait.Layer.html) that uses a custom [ErrorHandler] implementation.
    pub fn into_layer_with_error_handler<ResBody>(
        &self,
        error_handler: Arc<dyn ErrorHandler<ResBody>>,
    ) -> OidcTenantGateLayer<ResBody, Claims> {
        OidcTenantGateLayer::new(self.clone(), error_handler)
    }
}
