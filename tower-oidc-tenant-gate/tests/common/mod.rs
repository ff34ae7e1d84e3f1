#![allow(dead_code)]

use jsonwebtoken::EncodingKey;
use serde::{Deserialize, Serialize};

pub mod jwt;
pub mod util;

pub const DEFAULT_KID: &str = "default-kid";
pub const CLIENT_ID: &str = "11111111-2222-3333-4444-555555555555";
pub const CONTOSO: &str = "aa3efc31-e34b-4415-9c6f-aae13213cf33";
pub const FABRIKAM: &str = "43d106cd-a001-4919-a26f-41c820de286c";
pub const WOODGROVE: &str = "9188040d-6c67-4c5b-b112-36a304b66dad";

#[derive(Clone, Debug, Deserialize)]
pub struct RsaKey {
    pub private_key: String,
    pub modulus: String,
    pub exponent: String,
}

impl RsaKey {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .expect("Failed to create EncodingKey")
    }
}

#[derive(Serialize)]
pub struct OpenIdConfig {
    pub issuer: String,
    pub jwks_uri: String,
}

#[derive(Serialize)]
pub struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Serialize)]
struct Jwk {
    kty: String,
    #[serde(rename = "use")]
    use_: String,
    alg: String,
    kid: String,
    n: String,
    e: String,
}

pub fn jwks(keys: &[(&str, &RsaKey)]) -> Jwks {
    let keys = keys
        .iter()
        .map(|(kid, pub_key)| Jwk {
            kty: "RSA".to_string(),
            use_: "sig".to_string(),
            alg: "RS256".to_string(),
            kid: kid.to_string(),
            n: pub_key.modulus.to_string(),
            e: pub_key.exponent.to_string(),
        })
        .collect::<Vec<_>>();
    Jwks { keys }
}

pub fn jwks_json(keys: &[(&str, &RsaKey)]) -> String {
    serde_json::to_string(&jwks(keys)).expect("Failed to serialize JWKS")
}

/// Key set shaped like the Microsoft identity platform's: no `alg`, and
/// an `issuer` template on every key.
pub fn entra_jwks_json(keys: &[(&str, &RsaKey)]) -> String {
    let keys = keys
        .iter()
        .map(|(kid, pub_key)| {
            serde_json::json!({
                "kty": "RSA",
                "use": "sig",
                "kid": kid,
                "n": pub_key.modulus,
                "e": pub_key.exponent,
                "issuer": "https://login.microsoftonline.com/{tenantid}/v2.0",
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!({ "keys": keys }).to_string()
}

pub fn rsa_keys() -> [RsaKey; 2] {
    let key_pairs = include_str!("key-pairs.json");
    serde_json::from_str(key_pairs).expect("Failed to read key-pairs.json")
}
