use log::{debug, info};
use serde::Deserialize;
use url::Url;

#[cfg(test)]
use mockall::automock;

use crate::error::StartupError;

/// The parts of an OpenID Provider Metadata document that are used here.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct OidcConfig {
    pub jwks_uri: Url,
    pub claims_supported: Option<Vec<String>>,
}

#[cfg_attr(test, allow(dead_code))]
pub(crate) struct OidcDiscovery {}

#[cfg_attr(test, automock)]
impl OidcDiscovery {
    #[cfg_attr(test, allow(dead_code))]
    pub async fn discover(issuer_url: &Url) -> Result<OidcConfig, StartupError> {
        for path in metadata_urls(issuer_url)? {
            debug!("Querying provider metadata at {}", path);
            let Ok(response) = reqwest::get(path.clone()).await else {
                continue;
            };
            if let Ok(config) = response.json::<OidcConfig>().await {
                info!("Discovered provider metadata at {}", path);
                return Ok(config);
            }
        }
        Err(StartupError::OidcDiscoveryFailed(format!(
            "No provider metadata found for {}",
            issuer_url
        )))
    }
}

/// Candidate metadata locations for an issuer, in the order they are tried:
/// OpenID Connect Discovery first, then the RFC 8414 well-known variants.
fn metadata_urls(issuer_url: &Url) -> Result<Vec<Url>, StartupError> {
    let invalid =
        || StartupError::InvalidParameter(format!("Could not parse issuer: {}", issuer_url));

    let issuer_segments: Vec<&str> = issuer_url
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    let with_path = |segments: Vec<&str>| -> Result<Url, StartupError> {
        let mut url = issuer_url.clone();
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .clear()
            .extend(segments);
        Ok(url)
    };

    let appended = issuer_segments
        .iter()
        .copied()
        .chain([".well-known", "openid-configuration"])
        .collect::<Vec<_>>();
    let inserted = |well_known: &'static str| {
        [".well-known", well_known]
            .into_iter()
            .chain(issuer_segments.iter().copied())
            .collect::<Vec<_>>()
    };

    Ok(vec![
        with_path(appended)?,
        with_path(inserted("openid-configuration"))?,
        with_path(inserted("oauth-authorization-server"))?,
    ])
}
