use std::{fmt, sync::Arc, time::Duration};

use jsonwebtoken::jwk::JwkSet;
use mockall_double::double;
use url::Url;

use crate::{error::StartupError, issuer::IssuerValidator, validation::ClaimsValidationSpec};

#[double]
use crate::oidc::OidcDiscovery;

const DEFAULT_JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// How to obtain the keys that token signatures are checked against.
#[derive(Debug, Clone)]
pub enum ProviderKind {
    JwksUrl {
        jwks_url: Url,
        jwks_refresh_interval: Duration,
    },
    Static {
        jwks: JwkSet,
    },
}

/// One identity provider that tokens are accepted from.
#[derive(Clone)]
pub struct ProviderConfiguration {
    pub identifier: String,
    pub kind: ProviderKind,
    pub claims_validation_spec: ClaimsValidationSpec,
    pub issuer_validator: Option<Arc<dyn IssuerValidator>>,
}

impl fmt::Debug for ProviderConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfiguration")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("claims_validation_spec", &self.claims_validation_spec)
            .field("issuer_validator", &self.issuer_validator.is_some())
            .finish()
    }
}

impl ProviderConfiguration {
    /// Configure a provider by its issuer (authority) URL.
    ///
    /// Unless [jwks_url](ProviderConfigurationBuilder::jwks_url) is set, the
    /// provider's metadata is discovered when building. Given
    /// `https://login.microsoftonline.com/organizations/v2.0`, the following
    /// endpoints are tried in order:
    ///
    /// - `https://login.microsoftonline.com/organizations/v2.0/.well-known/openid-configuration`
    /// - `https://login.microsoftonline.com/.well-known/openid-configuration/organizations/v2.0`
    /// - `https://login.microsoftonline.com/.well-known/oauth-authorization-server/organizations/v2.0`
    pub fn builder(issuer_url: impl Into<String>) -> ProviderConfigurationBuilder {
        ProviderConfigurationBuilder::new(issuer_url.into())
    }

    /// Configure a provider with a fixed JSON Web Key Set.
    ///
    /// No network access is needed; keys are never rotated.
    pub fn static_builder(jwks: impl Into<String>) -> StaticProviderConfigurationBuilder {
        StaticProviderConfigurationBuilder::new(jwks.into())
    }
}

pub struct ProviderConfigurationBuilder {
    identifier: Option<String>,
    issuer_url: String,
    jwks_url: Option<String>,
    audiences: Vec<String>,
    jwks_refresh_interval: Option<Duration>,
    claims_validation_spec: Option<ClaimsValidationSpec>,
    issuer_validator: Option<Arc<dyn IssuerValidator>>,
}

impl ProviderConfigurationBuilder {
    fn new(issuer_url: String) -> Self {
        Self {
            identifier: None,
            issuer_url,
            jwks_url: None,
            audiences: Vec::new(),
            jwks_refresh_interval: None,
            claims_validation_spec: None,
            issuer_validator: None,
        }
    }

    /// Name used in logs. Defaults to the issuer URL.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Skip metadata discovery and fetch keys from this URL.
    pub fn jwks_url(mut self, jwks_url: impl Into<String>) -> Self {
        self.jwks_url = Some(jwks_url.into());
        self
    }

    /// Expected values of the `aud` claim, typically the application's client id.
    pub fn audiences(mut self, audiences: &[impl ToString]) -> Self {
        self.audiences = audiences.iter().map(|aud| aud.to_string()).collect();
        self
    }

    /// How often keys are re-fetched. Defaults to 60 seconds.
    pub fn jwks_refresh_interval(mut self, jwks_refresh_interval: Duration) -> Self {
        self.jwks_refresh_interval = Some(jwks_refresh_interval);
        self
    }

    /// Replace the claims validation derived from audiences and provider metadata.
    pub fn claims_validation(mut self, claims_validation: ClaimsValidationSpec) -> Self {
        self.claims_validation_spec = Some(claims_validation);
        self
    }

    /// Decide acceptable issuers with `issuer_validator` instead of
    /// comparing `iss` to the issuer URL.
    ///
    /// Needed for multi-tenant authorities such as
    /// `https://login.microsoftonline.com/organizations/v2.0`, whose tokens
    /// carry the issuing tenant's own issuer.
    pub fn issuer_validator(mut self, issuer_validator: Arc<dyn IssuerValidator>) -> Self {
        self.issuer_validator = Some(issuer_validator);
        self
    }

    pub async fn build(self) -> Result<ProviderConfiguration, StartupError> {
        let issuer_url = Url::parse(&self.issuer_url)
            .map_err(|_| StartupError::InvalidParameter("Invalid issuer_url format".to_owned()))?;

        let explicit_jwks_url = self
            .jwks_url
            .as_deref()
            .map(|jwks_url| {
                Url::parse(jwks_url).map_err(|_| {
                    StartupError::InvalidParameter("Invalid jwks_url format".to_owned())
                })
            })
            .transpose()?;

        let (jwks_url, oidc_config) = match explicit_jwks_url {
            Some(jwks_url) => (jwks_url, None),
            None => {
                let config = OidcDiscovery::discover(&issuer_url).await?;
                (config.jwks_uri.clone(), Some(config))
            }
        };

        let expected_issuer = match self.issuer_validator {
            Some(_) => None,
            None => Some(self.issuer_url.as_str()),
        };
        let claims_validation_spec = match self.claims_validation_spec {
            Some(spec) if self.issuer_validator.is_some() => spec.without_iss(),
            Some(spec) => spec,
            None => ClaimsValidationSpec::from_oidc_config(
                expected_issuer,
                &self.audiences,
                oidc_config.as_ref(),
            ),
        };

        Ok(ProviderConfiguration {
            identifier: self.identifier.unwrap_or(self.issuer_url),
            kind: ProviderKind::JwksUrl {
                jwks_url,
                jwks_refresh_interval: self
                    .jwks_refresh_interval
                    .unwrap_or(DEFAULT_JWKS_REFRESH_INTERVAL),
            },
            claims_validation_spec,
            issuer_validator: self.issuer_validator,
        })
    }
}

pub struct StaticProviderConfigurationBuilder {
    identifier: Option<String>,
    jwks: String,
    audiences: Vec<String>,
    claims_validation_spec: Option<ClaimsValidationSpec>,
    issuer_validator: Option<Arc<dyn IssuerValidator>>,
}

impl StaticProviderConfigurationBuilder {
    fn new(jwks: String) -> Self {
        Self {
            identifier: None,
            jwks,
            audiences: Vec::new(),
            claims_validation_spec: None,
            issuer_validator: None,
        }
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn audiences(mut self, audiences: &[impl ToString]) -> Self {
        self.audiences = audiences.iter().map(|aud| aud.to_string()).collect();
        self
    }

    pub fn claims_validation(mut self, claims_validation: ClaimsValidationSpec) -> Self {
        self.claims_validation_spec = Some(claims_validation);
        self
    }

    pub fn issuer_validator(mut self, issuer_validator: Arc<dyn IssuerValidator>) -> Self {
        self.issuer_validator = Some(issuer_validator);
        self
    }

    pub fn build(self) -> Result<ProviderConfiguration, StartupError> {
        let jwks = serde_json::from_str::<JwkSet>(&self.jwks)
            .map_err(|e| StartupError::InvalidParameter(format!("Invalid JWKS: {}", e)))?;

        let claims_validation_spec = match self.claims_validation_spec {
            Some(spec) if self.issuer_validator.is_some() => spec.without_iss(),
            Some(spec) => spec,
            None => ClaimsValidationSpec::from_oidc_config(None, &self.audiences, None),
        };

        Ok(ProviderConfiguration {
            identifier: self.identifier.unwrap_or_else(|| "static".to_owned()),
            kind: ProviderKind::Static { jwks },
            claims_validation_spec,
            issuer_validator: self.issuer_validator,
        })
    }
}
