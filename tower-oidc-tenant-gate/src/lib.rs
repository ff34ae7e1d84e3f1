#![doc = include_str!("../README.md")]

/// [Authorizer](crate::authorizer::token_authorizer::Authorizer) is the struct responsible for
/// validating tokens and performing JWKS rotation against the identity provider.
///
/// Not to be used directly.
pub mod authorizer;

/// Builder used to construct an [OidcTenantGate](crate::server::OidcTenantGate) instance.
///
/// For further information on the different properties,
/// see [OidcTenantGateBuilder](crate::builder::OidcTenantGateBuilder)
/// and [ProviderConfigurationBuilder](crate::provider::ProviderConfigurationBuilder).
///
/// # Example using [DefaultClaims](crate::claims::DefaultClaims)
///
/// ```no_run
/// use std::sync::Arc;
/// use tower_oidc_tenant_gate::issuer::{TenantAllowList, TenantIssuerValidator};
/// use tower_oidc_tenant_gate::provider::ProviderConfiguration;
/// use tower_oidc_tenant_gate::server::OidcTenantGate;
///
/// #[tokio::main]
/// async fn main() {
///     let tenants = TenantAllowList::new([
///         "aa3efc31-e34b-4415-9c6f-aae13213cf33",
///         "43d106cd-a001-4919-a26f-41c820de286c",
///     ]);
///     let gate = <OidcTenantGate>::builder()
///         .provider(ProviderConfiguration::builder("https://login.microsoftonline.com/organizations/v2.0")
///             .audiences(&["11111111-2222-3333-4444-555555555555"])
///             .issuer_validator(Arc::new(TenantIssuerValidator::new(tenants)))
///             .build().await.expect("Failed to build provider configuration"))
///         .build()
///         .await
///         .expect("Failed to build gate");
/// }
/// ```
///
/// # Example using custom claims implementation
///
/// ```
/// use serde::Deserialize;
/// use tower_oidc_tenant_gate::provider::ProviderConfiguration;
/// use tower_oidc_tenant_gate::server::OidcTenantGate;
///
/// #[derive(Clone, Debug, Deserialize)]
/// struct MyClaims {
///     pub tid: String,
///     pub roles: Vec<String>,
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let gate = OidcTenantGate::<MyClaims>::builder()
///         .provider(ProviderConfiguration::static_builder(r#"{ "keys": [] }"#)
///             .build().expect("Failed to build provider configuration"))
///         .build()
///         .await
///         .expect("Failed to build gate");
/// }
/// ```
pub mod builder;

/// Default claims implementation.
///
/// Used by default when constructing an [OidcTenantGate](crate::server::OidcTenantGate).
///
/// If you need other claims, an own struct can be provided
/// to [OidcTenantGate](crate::server::OidcTenantGate) as a
/// generic parameter.
pub mod claims;

/// [AzureAdSettings](crate::config::AzureAdSettings) reads the `AzureAd`
/// settings block from a YAML file and `AZUREAD_*` environment variables.
pub mod config;

/// Errors returned while starting up and while authenticating requests.
pub mod error;

/// Responses sent for requests that fail authentication.
///
/// [DefaultErrorHandler](crate::error_handler::DefaultErrorHandler) is used
/// unless another handler is given to
/// [into_layer_with_error_handler](crate::server::OidcTenantGate::into_layer_with_error_handler).
pub mod error_handler;

/// Tenant allow-list and the issuer check built on it.
///
/// A token is accepted only if its `iss` claim equals
/// `https://login.microsoftonline.com/{tenantId}/v2.0` for one of the
/// accepted tenant ids. Anything else is rejected with
/// [InvalidIssuer](crate::issuer::InvalidIssuer).
pub mod issuer;

/// The actual tower middleware
///
/// Contains implementations of [Service](https://docs.rs/tower/latest/tower/trait.Service.html)
/// and [Layer](https://docs.rs/tower/latest/tower/trait.Layer.html)
/// from the tower library.
///
/// You shouldn't need to interact with these implementations, more than
/// calling [OidcTenantGate::into_layer()](crate::server::OidcTenantGate::into_layer).
pub mod layer;

/// [ProviderConfiguration](crate::provider::ProviderConfiguration) is used to
/// configure the interaction with and validation strategy against the identity provider.
///
/// Provided when constructing an [OidcTenantGate](crate::server::OidcTenantGate)
/// via [provider](crate::builder::OidcTenantGateBuilder::provider).
pub mod provider;

/// [OidcTenantGate](crate::server::OidcTenantGate) is
/// what underpins the tower middleware, and actually performs
/// JWT validation.
///
/// In addition, it queries and maintains a state of public
/// keys used by the identity provider.
pub mod server;

/// [ClaimsValidationSpec](crate::validation::ClaimsValidationSpec) is used to
/// optionally customize what claims that are required in incoming JWTs.
///
/// Provided via [claims_validation](crate::provider::ProviderConfigurationBuilder::claims_validation).
pub mod validation;

/// [UnverifiedJwt](crate::jwt_unverified::UnverifiedJwt) is used internally
/// to represent a token that has not been validated yet.
pub mod jwt_unverified;

mod jwt_extract;
mod oidc;
