use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::{error::StartupError, provider::ProviderConfiguration, server::OidcTenantGate};

#[derive(Debug)]
pub struct OidcTenantGateBuilder<Claims>
where
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    provider: Option<ProviderConfiguration>,
    phantom: PhantomData<Claims>,
}

impl<Claims> OidcTenantGate<Claims>
where
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    pub fn builder() -> OidcTenantGateBuilder<Claims> {
        OidcTenantGateBuilder::new()
    }
}

impl<Claims> OidcTenantGateBuilder<Claims>
where
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    fn new() -> Self {
        OidcTenantGateBuilder::<Claims> {
            provider: None,
            phantom: PhantomData,
        }
    }

    /// The identity provider whose tokens are accepted.
    pub fn provider(mut self, provider: ProviderConfiguration) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Construct an OidcTenantGate.
    ///
    /// For providers configured with a JWKS URL, this spawns the key
    /// rotation task and must therefore run inside a tokio runtime.
    pub async fn build(self) -> Result<OidcTenantGate<Claims>, StartupError> {
        let provider = self.provider.ok_or(StartupError::InvalidParameter(
            "An identity provider is required".to_owned(),
        ))?;
        Ok(OidcTenantGate::new(provider).await)
    }
}

impl<Claims> Default for OidcTenantGateBuilder<Claims>
where
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
