use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header,
    errors::ErrorKind,
    jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm},
    Algorithm, DecodingKey, Validation,
};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{AuthError, JwkError},
    issuer::IssuerValidator,
    jwt_unverified::UnverifiedJwt,
    validation::ClaimsValidationSpec,
};

use super::jwks::JwksConsumer;

pub trait JwtValidator<Claims> {
    fn validate(&self, jwt: &UnverifiedJwt) -> Result<Claims, AuthError>;
}

/// Validates JWTs against the most recently received key set.
///
/// Signature, `exp`, `nbf`, `aud` and, without an issuer validator, `iss`
/// are checked by `jsonwebtoken`. When an [IssuerValidator] is set it runs
/// last, on the verified claims.
pub struct OnlyJwtValidator {
    claims_validation: ClaimsValidationSpec,
    issuer_validator: Option<Arc<dyn IssuerValidator>>,
    decoding_keys: RwLock<HashMap<String, DecodingKey>>,
    validations: RwLock<HashMap<Algorithm, Validation>>,
}

impl<Claims> JwtValidator<Claims> for OnlyJwtValidator
where
    Claims: DeserializeOwned,
{
    fn validate(&self, token: &UnverifiedJwt) -> Result<Claims, AuthError> {
        let header = decode_header(token.as_str()).or(Err(AuthError::ParseJwtError))?;
        let key_id = header.kid.ok_or(AuthError::ParseJwtError)?;

        let claims = {
            let decoding_keys = self
                .decoding_keys
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let decoding_key = decoding_keys.get(&key_id).ok_or(AuthError::InvalidKeyId)?;
            let validations = self
                .validations
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let validation = validations
                .get(&header.alg)
                .ok_or(AuthError::UnsupportedAlgorithm(header.alg))?;

            decode::<Value>(token.as_str(), decoding_key, validation)
                .map_err(|e| AuthError::ValidationFailed {
                    reason: e.into_kind(),
                })?
                .claims
        };

        if let Some(issuer_validator) = &self.issuer_validator {
            let issuer = claims
                .get("iss")
                .and_then(Value::as_str)
                .ok_or_else(|| AuthError::ValidationFailed {
                    reason: ErrorKind::MissingRequiredClaim("iss".to_owned()),
                })?;
            issuer_validator.validate_issuer(issuer, &claims, &self.claims_validation)?;
        }

        serde_json::from_value(claims).map_err(|e| AuthError::ValidationFailed {
            reason: ErrorKind::Json(Arc::new(e)),
        })
    }
}

#[async_trait]
impl JwksConsumer for OnlyJwtValidator {
    async fn receive_jwks(&self, jwks: JwkSet) {
        self.update_decoding_keys(&jwks);
        self.update_validations(&jwks);
    }
}

impl OnlyJwtValidator {
    pub fn new(
        claims_validation: ClaimsValidationSpec,
        issuer_validator: Option<Arc<dyn IssuerValidator>>,
    ) -> Self {
        Self {
            claims_validation,
            issuer_validator,
            decoding_keys: RwLock::new(HashMap::new()),
            validations: RwLock::new(HashMap::new()),
        }
    }

    fn update_validations(&self, jwks: &JwkSet) {
        let algs = jwks
            .keys
            .iter()
            .filter_map(jwk_algorithm)
            .collect::<HashSet<_>>();
        let mut validations = self
            .validations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *validations = algs
            .into_iter()
            .map(|alg| (alg, self.create_validation(alg)))
            .collect();
    }

    fn create_validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        let mut required_claims = Vec::<&'static str>::new();
        if let Some(iss) = &self.claims_validation.iss {
            required_claims.push("iss");
            validation.set_issuer(&[iss]);
        } else if self.issuer_validator.is_some() {
            required_claims.push("iss");
        }
        validation.validate_exp = self.claims_validation.exp;
        if self.claims_validation.exp {
            required_claims.push("exp");
        }
        validation.validate_nbf = self.claims_validation.nbf;
        if self.claims_validation.nbf {
            required_claims.push("nbf");
        }
        if let Some(aud) = &self.claims_validation.aud {
            required_claims.push("aud");
            validation.set_audience(aud);
        } else {
            validation.validate_aud = false;
        }
        validation.set_required_spec_claims(&required_claims);
        validation
    }

    fn update_decoding_keys(&self, jwks: &JwkSet) {
        let decoding_keys = jwks
            .keys
            .iter()
            .map(parse_jwk)
            .collect::<Result<HashMap<_, _>, _>>();
        match decoding_keys {
            Ok(decoding_keys) => {
                let mut keys = self
                    .decoding_keys
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                *keys = decoding_keys;
                info!("Successfully updated JWK set");
            }
            Err(e) => {
                warn!("Unable to parse at least one JWK due to: {:?}", e);
            }
        }
    }
}

fn parse_jwk(jwk: &Jwk) -> Result<(String, DecodingKey), JwkError> {
    let key_id = jwk.common.key_id.as_ref().ok_or(JwkError::MissingKeyId)?;
    let decoding_key = DecodingKey::from_jwk(jwk).map_err(|_| JwkError::DecodingFailed)?;
    Ok((key_id.clone(), decoding_key))
}

/// The algorithm tokens signed with `jwk` are expected to use.
///
/// Key sets such as the Microsoft identity platform's omit `alg`; those
/// keys get the default algorithm of their key type.
fn jwk_algorithm(jwk: &Jwk) -> Option<Algorithm> {
    if let Some(key_alg) = jwk.common.key_algorithm {
        return parse_key_alg(key_alg);
    }
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::OctetKeyPair(_) => Some(Algorithm::EdDSA),
        _ => None,
    }
}

fn parse_key_alg(key_alg: KeyAlgorithm) -> Option<Algorithm> {
    match key_alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}
