pub mod token_authorizer;

pub(crate) mod jwks;
pub(crate) mod jwt_validate;
