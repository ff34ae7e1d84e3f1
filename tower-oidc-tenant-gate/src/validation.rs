use std::fmt::Display;

use crate::oidc::OidcConfig;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimsValidationSpec {
    pub iss: Option<String>,
    pub exp: bool,
    pub nbf: bool,
    pub aud: Option<Vec<String>>,
}

impl ClaimsValidationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_oidc_config(
        issuer: Option<&str>,
        audiences: &[String],
        oidc_config: Option<&OidcConfig>,
    ) -> Self {
        let mut spec = ClaimsValidationSpec::new().exp(true);
        if !audiences.is_empty() {
            spec = spec.aud(audiences.to_vec());
        }
        if let Some(issuer) = issuer {
            spec = spec.iss(issuer);
        }
        let nbf_supported = oidc_config
            .and_then(|config| config.claims_supported.as_ref())
            .is_some_and(|claims| claims.iter().any(|c| c == "nbf"));
        if nbf_supported {
            spec = spec.nbf(true);
        }
        spec
    }

    pub fn iss(mut self, issuer: &str) -> Self {
        self.iss = Some(issuer.to_owned());
        self
    }

    /// Stop comparing `iss` against a single expected value.
    ///
    /// Used when an [IssuerValidator](crate::issuer::IssuerValidator)
    /// decides which issuers are acceptable.
    pub fn without_iss(mut self) -> Self {
        self.iss = None;
        self
    }

    pub fn exp(mut self, validate: bool) -> Self {
        self.exp = validate;
        self
    }

    pub fn nbf(mut self, validate: bool) -> Self {
        self.nbf = validate;
        self
    }

    pub fn aud(mut self, audiences: Vec<String>) -> Self {
        self.aud = Some(audiences);
        self
    }
}

impl Display for ClaimsValidationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nbf_follows_claims_supported() {
        let config = OidcConfig {
            jwks_uri: "https://issuer.com/keys".parse().unwrap(),
            claims_supported: Some(vec!["sub".to_owned(), "nbf".to_owned()]),
        };
        let spec = ClaimsValidationSpec::from_oidc_config(None, &[], Some(&config));

        assert!(spec.nbf);
        assert!(spec.exp);
        assert_eq!(spec.iss, None);
        assert_eq!(spec.aud, None);
    }

    #[test]
    fn audiences_and_issuer() {
        let spec = ClaimsValidationSpec::from_oidc_config(
            Some("https://issuer.com"),
            &["client-id".to_owned()],
            None,
        );

        assert!(!spec.nbf);
        assert_eq!(spec.iss.as_deref(), Some("https://issuer.com"));
        assert_eq!(spec.aud, Some(vec!["client-id".to_owned()]));
        assert_eq!(spec.without_iss().iss, None);
    }
}
