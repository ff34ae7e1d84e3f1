use std::{path::Path, sync::Arc, time::Duration};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::StartupError,
    issuer::{TenantAllowList, TenantIssuerValidator},
    provider::ProviderConfiguration,
};

/// Key of the settings block in the configuration file.
pub const SETTINGS_KEY: &str = "AzureAd";
/// Prefix of environment variables overriding the settings block,
/// e.g. `AZUREAD_CLIENTID`.
pub const ENV_PREFIX: &str = "AZUREAD_";

/// Settings for signing in with the Microsoft identity platform.
///
/// ```yaml
/// AzureAd:
///   Instance: https://login.microsoftonline.com/
///   TenantId: organizations
///   ClientId: 11111111-2222-3333-4444-555555555555
///   AcceptedTenantIds:
///     - aa3efc31-e34b-4415-9c6f-aae13213cf33
///     - 43d106cd-a001-4919-a26f-41c820de286c
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AzureAdSettings {
    pub instance: String,
    pub tenant_id: String,
    pub client_id: String,
    #[serde(default)]
    pub accepted_tenant_ids: Vec<String>,
    pub jwks_refresh_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_url: Option<String>,
}

const FIELDS: &[&str] = &[
    "Instance",
    "TenantId",
    "ClientId",
    "AcceptedTenantIds",
    "JwksRefreshIntervalSecs",
    "SignInUrl",
];

/// `AZUREAD_CLIENTID` and `AzureAd_ClientId` both set `ClientId`.
fn field_name(key: &UncasedStr) -> Uncased<'_> {
    FIELDS
        .iter()
        .find(|field| key.as_str().eq_ignore_ascii_case(field))
        .map_or_else(|| key.into(), |field| (*field).into())
}

impl Default for AzureAdSettings {
    fn default() -> Self {
        Self {
            instance: "https://login.microsoftonline.com/".to_owned(),
            tenant_id: "organizations".to_owned(),
            client_id: String::new(),
            accepted_tenant_ids: Vec::new(),
            jwks_refresh_interval_secs: 60,
            sign_in_url: None,
        }
    }
}

impl AzureAdSettings {
    /// Defaults, then the `AzureAd` block of the YAML file at `path`
    /// (if it exists), then `AZUREAD_*` environment variables.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(AzureAdSettings::default()))
            .merge(Figment::from(Yaml::file(path)).focus(SETTINGS_KEY))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .map(field_name)
                    .lowercase(false),
            )
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, StartupError> {
        let settings: AzureAdSettings = figment
            .extract()
            .map_err(|e| StartupError::InvalidConfiguration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), StartupError> {
        if self.client_id.trim().is_empty() {
            return Err(StartupError::InvalidConfiguration(
                "ClientId is required".to_owned(),
            ));
        }
        if let Some(blank) = self
            .accepted_tenant_ids
            .iter()
            .find(|tid| tid.trim().is_empty() || tid.contains('/'))
        {
            return Err(StartupError::InvalidConfiguration(format!(
                "Invalid tenant id in AcceptedTenantIds: '{}'",
                blank
            )));
        }
        if self.jwks_refresh_interval_secs == 0 {
            return Err(StartupError::InvalidConfiguration(
                "JwksRefreshIntervalSecs must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// The authority tokens are requested from, e.g.
    /// `https://login.microsoftonline.com/organizations/v2.0`.
    pub fn authority(&self) -> String {
        format!(
            "{}/{}/v2.0",
            self.instance.trim_end_matches('/'),
            self.tenant_id
        )
    }

    pub fn tenant_allow_list(&self) -> TenantAllowList {
        TenantAllowList::new(self.accepted_tenant_ids.iter().cloned())
    }

    /// Provider configuration that only accepts tokens from `AcceptedTenantIds`.
    ///
    /// Queries the authority's metadata endpoint.
    pub async fn provider_configuration(&self) -> Result<ProviderConfiguration, StartupError> {
        ProviderConfiguration::builder(self.authority())
            .audiences(&[&self.client_id])
            .jwks_refresh_interval(Duration::from_secs(self.jwks_refresh_interval_secs))
            .issuer_validator(Arc::new(TenantIssuerValidator::new(
                self.tenant_allow_list(),
            )))
            .build()
            .await
    }
}
