use std::sync::Arc;

use log::info;
use serde::de::DeserializeOwned;

use crate::{
    authorizer::{
        jwks::{JwksConsumer, JwksProducer, TimerJwksProducer},
        jwt_validate::{JwtValidator, OnlyJwtValidator},
    },
    error::AuthError,
    jwt_unverified::UnverifiedJwt,
    provider::{ProviderConfiguration, ProviderKind},
};

/// Validates tokens issued by one identity provider.
#[derive(Clone)]
pub struct Authorizer<Claims> {
    identifier: String,
    jwt_validator: Arc<dyn JwtValidator<Claims> + Send + Sync>,
}

impl<Claims> Authorizer<Claims>
where
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) async fn new(config: ProviderConfiguration) -> Self {
        info!(
            "Authorizer '{}' will validate the following claims: {}{}",
            &config.identifier,
            &config.claims_validation_spec,
            if config.issuer_validator.is_some() {
                " (issuer checked by issuer validator)"
            } else {
                ""
            }
        );

        let validator = Arc::new(OnlyJwtValidator::new(
            config.claims_validation_spec,
            config.issuer_validator,
        ));

        match config.kind {
            ProviderKind::JwksUrl {
                jwks_url,
                jwks_refresh_interval,
            } => {
                let mut jwks_producer = TimerJwksProducer::new(jwks_url, jwks_refresh_interval);
                jwks_producer.add_consumer(validator.clone());
                jwks_producer.start();
            }
            ProviderKind::Static { jwks } => {
                validator.receive_jwks(jwks).await;
            }
        };

        Self {
            identifier: config.identifier,
            jwt_validator: validator,
        }
    }
}

impl<Claims> Authorizer<Claims> {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn validate(&self, token: &UnverifiedJwt) -> Result<Claims, AuthError> {
        self.jwt_validator.validate(token)
    }
}
