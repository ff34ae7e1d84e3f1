use std::{error::Error, fmt::Display, sync::Arc};

use serde_json::Value;

use crate::validation::ClaimsValidationSpec;

/// Message carried by every [InvalidIssuer] rejection.
pub const INVALID_ISSUER_MESSAGE: &str = "The sign-in user's account does not belong to one of the tenants that this Web App accepts users from.";

const ISSUER_PREFIX: &str = "https://login.microsoftonline.com/";
const ISSUER_SUFFIX: &str = "/v2.0";

/// Returns the issuer URL that the Microsoft identity platform
/// puts in `iss` for tokens issued by `tenant_id`.
///
/// ```
/// use tower_oidc_tenant_gate::issuer::issuer_url;
///
/// assert_eq!(
///     issuer_url("aa3efc31-e34b-4415-9c6f-aae13213cf33"),
///     "https://login.microsoftonline.com/aa3efc31-e34b-4415-9c6f-aae13213cf33/v2.0"
/// );
/// ```
pub fn issuer_url(tenant_id: &str) -> String {
    format!("{}{}{}", ISSUER_PREFIX, tenant_id, ISSUER_SUFFIX)
}

/// The token's issuer is not one of the accepted tenants.
///
/// Displays as [INVALID_ISSUER_MESSAGE]. The rejected issuer is kept
/// for diagnostics only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidIssuer {
    issuer: String,
}

impl InvalidIssuer {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl Display for InvalidIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(INVALID_ISSUER_MESSAGE)
    }
}
impl Error for InvalidIssuer {}

/// Tenant identifiers whose users may sign in.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TenantAllowList {
    tenant_ids: Arc<[String]>,
}

impl TenantAllowList {
    pub fn new<I, S>(tenant_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tenant_ids: tenant_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tenant_ids(&self) -> &[String] {
        &self.tenant_ids
    }

    pub fn is_empty(&self) -> bool {
        self.tenant_ids.is_empty()
    }

    /// Accepted issuer URLs, in allow-list order.
    pub fn issuer_urls(&self) -> impl Iterator<Item = String> + '_ {
        self.tenant_ids.iter().map(|tid| issuer_url(tid))
    }
}

/// Final step of token validation: decides whether the verified
/// token's `iss` claim is acceptable.
///
/// Called after signature, `exp`, `nbf` and `aud` have been checked.
/// Returns the issuer to use on success.
///
/// Closures with the same signature implement this trait, which allows
/// sourcing the accepted issuers from elsewhere (e.g. a database):
///
/// ```
/// use serde_json::Value;
/// use tower_oidc_tenant_gate::issuer::{InvalidIssuer, IssuerValidator};
/// use tower_oidc_tenant_gate::validation::ClaimsValidationSpec;
///
/// let validator = |issuer: &str, _claims: &Value, _validation: &ClaimsValidationSpec| {
///     if issuer.ends_with("/v2.0") {
///         Ok(issuer.to_owned())
///     } else {
///         Err(InvalidIssuer::new(issuer))
///     }
/// };
/// let result = validator.validate_issuer(
///     "https://login.microsoftonline.com/x/v2.0",
///     &Value::Null,
///     &ClaimsValidationSpec::new(),
/// );
/// assert!(result.is_ok());
/// ```
pub trait IssuerValidator: Send + Sync {
    fn validate_issuer(
        &self,
        issuer: &str,
        claims: &Value,
        validation: &ClaimsValidationSpec,
    ) -> Result<String, InvalidIssuer>;
}

impl<F> IssuerValidator for F
where
    F: Fn(&str, &Value, &ClaimsValidationSpec) -> Result<String, InvalidIssuer> + Send + Sync,
{
    fn validate_issuer(
        &self,
        issuer: &str,
        claims: &Value,
        validation: &ClaimsValidationSpec,
    ) -> Result<String, InvalidIssuer> {
        self(issuer, claims, validation)
    }
}

/// Accepts tokens issued by any tenant of a [TenantAllowList].
#[derive(Clone, Debug)]
pub struct TenantIssuerValidator {
    tenants: TenantAllowList,
}

impl TenantIssuerValidator {
    pub fn new(tenants: TenantAllowList) -> Self {
        Self { tenants }
    }

    pub fn tenants(&self) -> &TenantAllowList {
        &self.tenants
    }

    pub fn validate(&self, issuer: &str) -> Result<String, InvalidIssuer> {
        if self.tenants.issuer_urls().any(|valid| valid == issuer) {
            Ok(issuer.to_owned())
        } else {
            Err(InvalidIssuer::new(issuer))
        }
    }
}

impl IssuerValidator for TenantIssuerValidator {
    fn validate_issuer(
        &self,
        issuer: &str,
        _claims: &Value,
        _validation: &ClaimsValidationSpec,
    ) -> Result<String, InvalidIssuer> {
        self.validate(issuer)
    }
}
