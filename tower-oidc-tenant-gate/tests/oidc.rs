use std::{sync::Arc, time::Duration};

use http::StatusCode;
use tokio::time::{sleep, Instant};
use tower::{Service, ServiceBuilder, ServiceExt};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use tower_oidc_tenant_gate::{
    error::StartupError,
    issuer::{TenantAllowList, TenantIssuerValidator},
    provider::ProviderConfiguration,
    server::OidcTenantGate,
};

use crate::common::{
    jwks,
    jwt::JwtBuilder,
    rsa_keys,
    util::{echo, request_with_token},
    OpenIdConfig, CLIENT_ID, CONTOSO, DEFAULT_KID, WOODGROVE,
};

mod common;

const AUTHORITY_PATH: &str = "/organizations/v2.0";

async fn mock_authority() -> MockServer {
    let server = MockServer::start().await;
    let [rsa_key, ..] = rsa_keys();
    Mock::given(method("GET"))
        .and(path(format!(
            "{}/.well-known/openid-configuration",
            AUTHORITY_PATH
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(OpenIdConfig {
            issuer: "https://login.microsoftonline.com/{tenantid}/v2.0".to_owned(),
            jwks_uri: format!("{}/organizations/discovery/v2.0/keys", server.uri()),
        }))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/discovery/v2.0/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks(&[(DEFAULT_KID, &rsa_key)])))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn discovered_keys_gate_by_tenant() {
    let server = mock_authority().await;
    let provider = ProviderConfiguration::builder(format!("{}{}", server.uri(), AUTHORITY_PATH))
        .audiences(&[CLIENT_ID])
        .jwks_refresh_interval(Duration::from_millis(50))
        .issuer_validator(Arc::new(TenantIssuerValidator::new(TenantAllowList::new(
            [CONTOSO],
        ))))
        .build()
        .await
        .expect("Failed to build provider configuration");
    let gate = <OidcTenantGate>::builder()
        .provider(provider)
        .build()
        .await
        .expect("Failed to build OidcTenantGate");
    let mut service = ServiceBuilder::new()
        .layer(gate.into_layer())
        .service_fn(echo);

    let token = JwtBuilder::for_tenant(CONTOSO).build();
    let deadline = Instant::now() + Duration::from_secs(2);
    let status = loop {
        let response = service
            .ready()
            .await
            .unwrap()
            .call(request_with_token(&token))
            .await
            .unwrap();
        if response.status() == StatusCode::OK || Instant::now() > deadline {
            break response.status();
        }
        sleep(Duration::from_millis(20)).await;
    };
    assert_eq!(status, StatusCode::OK);

    let token = JwtBuilder::for_tenant(WOODGROVE).build();
    let response = service
        .ready()
        .await
        .unwrap()
        .call(request_with_token(&token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn discovery_failure_is_a_startup_error() {
    let server = MockServer::start().await;

    let result = ProviderConfiguration::builder(format!("{}{}", server.uri(), AUTHORITY_PATH))
        .audiences(&[CLIENT_ID])
        .build()
        .await;

    assert!(matches!(result, Err(StartupError::OidcDiscoveryFailed(_))));
}
