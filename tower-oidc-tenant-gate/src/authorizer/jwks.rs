use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use log::{debug, warn};
use tokio::time;
use url::Url;

use crate::error::JwkError;

pub trait JwksProducer {
    fn add_consumer(&mut self, consumer: Arc<dyn JwksConsumer>);
    fn start(&self);
}

#[async_trait]
pub trait JwksConsumer: Send + Sync {
    async fn receive_jwks(&self, jwks: JwkSet);
}

/// Periodically downloads the provider's key set and hands it to consumers.
///
/// The first download happens immediately after [start](JwksProducer::start).
pub struct TimerJwksProducer {
    jwks_url: Url,
    refresh_interval: Duration,
    consumers: Vec<Arc<dyn JwksConsumer>>,
}

impl TimerJwksProducer {
    pub fn new(jwks_url: Url, refresh_interval: Duration) -> Self {
        Self {
            jwks_url,
            refresh_interval,
            consumers: Vec::new(),
        }
    }
}

impl JwksProducer for TimerJwksProducer {
    fn add_consumer(&mut self, consumer: Arc<dyn JwksConsumer>) {
        self.consumers.push(consumer);
    }

    fn start(&self) {
        tokio::spawn(refresh_jwks(
            reqwest::Client::new(),
            self.jwks_url.clone(),
            self.refresh_interval,
            self.consumers.clone(),
        ));
    }
}

async fn refresh_jwks(
    client: reqwest::Client,
    jwks_url: Url,
    refresh_interval: Duration,
    consumers: Vec<Arc<dyn JwksConsumer>>,
) {
    let mut interval = time::interval(refresh_interval);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match fetch_jwks(&client, &jwks_url).await {
            Ok(jwks) => {
                debug!("Fetched {} keys from {}", jwks.keys.len(), jwks_url);
                for consumer in &consumers {
                    consumer.receive_jwks(jwks.clone()).await;
                }
            }
            Err(e) => warn!("Failed to fetch JWK set from {}: {}", jwks_url, e),
        }
    }
}

async fn fetch_jwks(client: &reqwest::Client, jwks_url: &Url) -> Result<JwkSet, JwkError> {
    client
        .get(jwks_url.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|_| JwkError::FetchFailed)?
        .json::<JwkSet>()
        .await
        .map_err(|_| JwkError::ParseFailed)
}
