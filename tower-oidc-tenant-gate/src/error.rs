use std::{error::Error, fmt::Display};

use jsonwebtoken::Algorithm;

use crate::issuer::InvalidIssuer;

#[derive(Clone, Debug, PartialEq)]
pub enum StartupError {
    InvalidParameter(String),
    OidcDiscoveryFailed(String),
    InvalidConfiguration(String),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl Error for StartupError {}

#[derive(Clone, Debug, PartialEq)]
pub enum JwkError {
    FetchFailed,
    ParseFailed,
    MissingKeyId,
    DecodingFailed,
}

impl Display for JwkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl Error for JwkError {}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthError {
    MissingAuthorizationHeader,
    InvalidAuthorizationHeader,
    ParseJwtError,
    InvalidKeyId,
    UnsupportedAlgorithm(Algorithm),
    ValidationFailed {
        reason: jsonwebtoken::errors::ErrorKind,
    },
    InvalidIssuer(InvalidIssuer),
}

impl AuthError {
    /// Whether the request carried no usable credentials at all,
    /// as opposed to carrying a token that failed validation.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthorizationHeader | AuthError::InvalidAuthorizationHeader
        )
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidIssuer(e) => write!(f, "InvalidIssuer: {}", e),
            _ => write!(f, "{:?}", self),
        }
    }
}
impl Error for AuthError {}

impl From<InvalidIssuer> for AuthError {
    fn from(e: InvalidIssuer) -> Self {
        AuthError::InvalidIssuer(e)
    }
}
