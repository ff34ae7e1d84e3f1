use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_with::{formats::PreferMany, serde_as, OneOrMany};

/// Default claims implementation
///
/// Covers the registered claims plus the ones the Microsoft identity
/// platform adds to ID and access tokens. Provide an own struct as generic
/// parameter of [OidcTenantGate](crate::server::OidcTenantGate) if you
/// need others.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DefaultClaims {
    pub iss: Option<String>,
    pub sub: Option<String>,
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    pub aud: Vec<String>,
    pub jti: Option<String>,
    /// Tenant the signed-in account belongs to.
    pub tid: Option<String>,
    pub name: Option<String>,
    pub preferred_username: Option<String>,
}

impl DefaultClaims {
    /// Best available human readable name of the signed-in account.
    pub fn display_name(&self) -> Option<&str> {
        self.preferred_username
            .as_deref()
            .or(self.name.as_deref())
            .or(self.sub.as_deref())
    }
}

impl Display for DefaultClaims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
