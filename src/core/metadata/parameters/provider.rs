use std::fmt;

use anyhow::{bail, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use url::Url;

use crate::core::{
    authorization_request::parameters::{Acr, Display, ResponseMode, ResponseType},
    object::TypedParameter,
};

fn array<T>(value: Json) -> Result<Vec<T>>
where
    T: TryFrom<Json, Error = Error>,
{
    let Json::Array(xs) = value else {
        bail!("expected JSON array")
    };
    xs.into_iter().map(T::try_from).collect()
}

fn strings(value: Json) -> Result<Vec<String>> {
    Ok(serde_json::from_value(value)?)
}

fn to_array<T: Into<Json>>(values: Vec<T>) -> Json {
    Json::Array(values.into_iter().map(Into::into).collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer(pub Url);

impl TypedParameter for Issuer {
    const KEY: &'static str = "issuer";
}

impl TryFrom<Json> for Issuer {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let url: Url = serde_json::from_value(value)?;
        if url.query().is_some() || url.fragment().is_some() {
            bail!("the issuer must not have a query or fragment component")
        }
        Ok(Self(url))
    }
}

impl From<Issuer> for Json {
    fn from(value: Issuer) -> Json {
        Json::String(value.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationEndpoint(pub Url);

impl TypedParameter for AuthorizationEndpoint {
    const KEY: &'static str = "authorization_endpoint";
}

impl TryFrom<Json> for AuthorizationEndpoint {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<AuthorizationEndpoint> for Json {
    fn from(value: AuthorizationEndpoint) -> Json {
        Json::String(value.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEndpoint(pub Url);

impl TypedParameter for TokenEndpoint {
    const KEY: &'static str = "token_endpoint";
}

impl TryFrom<Json> for TokenEndpoint {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<TokenEndpoint> for Json {
    fn from(value: TokenEndpoint) -> Json {
        Json::String(value.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserinfoEndpoint(pub Url);

impl TypedParameter for UserinfoEndpoint {
    const KEY: &'static str = "userinfo_endpoint";
}

impl TryFrom<Json> for UserinfoEndpoint {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<UserinfoEndpoint> for Json {
    fn from(value: UserinfoEndpoint) -> Json {
        Json::String(value.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwksUri(pub Url);

impl TypedParameter for JwksUri {
    const KEY: &'static str = "jwks_uri";
}

impl TryFrom<Json> for JwksUri {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<JwksUri> for Json {
    fn from(value: JwksUri) -> Json {
        Json::String(value.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTypesSupported(pub Vec<ResponseType>);

impl ResponseTypesSupported {
    pub fn supports(&self, response_type: &ResponseType) -> bool {
        self.0.contains(response_type)
    }
}

impl TypedParameter for ResponseTypesSupported {
    const KEY: &'static str = "response_types_supported";
}

impl TryFrom<Json> for ResponseTypesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        array(value).map(Self)
    }
}

impl From<ResponseTypesSupported> for Json {
    fn from(value: ResponseTypesSupported) -> Json {
        to_array(value.0)
    }
}

/// `["query", "fragment"]` when not published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseModesSupported(pub Vec<ResponseMode>);

impl Default for ResponseModesSupported {
    fn default() -> Self {
        Self(vec![ResponseMode::Query, ResponseMode::Fragment])
    }
}

impl TypedParameter for ResponseModesSupported {
    const KEY: &'static str = "response_modes_supported";
}

impl TryFrom<Json> for ResponseModesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        array(value).map(Self)
    }
}

impl From<ResponseModesSupported> for Json {
    fn from(value: ResponseModesSupported) -> Json {
        to_array(value.0)
    }
}

const PUBLIC: &str = "public";
const PAIRWISE: &str = "pairwise";

/// How the provider derives the `sub` claim (OpenID Connect Core 1.0, Section 8).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SubjectType {
    Public,
    Pairwise,
    Other(String),
}

impl From<String> for SubjectType {
    fn from(s: String) -> Self {
        match s.as_str() {
            PUBLIC => SubjectType::Public,
            PAIRWISE => SubjectType::Pairwise,
            _ => SubjectType::Other(s),
        }
    }
}

impl From<SubjectType> for String {
    fn from(value: SubjectType) -> Self {
        match value {
            SubjectType::Other(o) => o,
            known => known.to_string(),
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Public => PUBLIC,
            SubjectType::Pairwise => PAIRWISE,
            SubjectType::Other(o) => o,
        }
        .fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTypesSupported(pub Vec<SubjectType>);

impl TypedParameter for SubjectTypesSupported {
    const KEY: &'static str = "subject_types_supported";
}

impl TryFrom<Json> for SubjectTypesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<SubjectTypesSupported> for Json {
    fn from(value: SubjectTypesSupported) -> Json {
        to_array(value.0.into_iter().map(String::from).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTokenSigningAlgValuesSupported(pub Vec<String>);

impl TypedParameter for IdTokenSigningAlgValuesSupported {
    const KEY: &'static str = "id_token_signing_alg_values_supported";
}

impl TryFrom<Json> for IdTokenSigningAlgValuesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        strings(value).map(Self)
    }
}

impl From<IdTokenSigningAlgValuesSupported> for Json {
    fn from(value: IdTokenSigningAlgValuesSupported) -> Json {
        to_array(value.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopesSupported(pub Vec<String>);

impl TypedParameter for ScopesSupported {
    const KEY: &'static str = "scopes_supported";
}

impl TryFrom<Json> for ScopesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        strings(value).map(Self)
    }
}

impl From<ScopesSupported> for Json {
    fn from(value: ScopesSupported) -> Json {
        to_array(value.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsSupported(pub Vec<String>);

impl TypedParameter for ClaimsSupported {
    const KEY: &'static str = "claims_supported";
}

impl TryFrom<Json> for ClaimsSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        strings(value).map(Self)
    }
}

impl From<ClaimsSupported> for Json {
    fn from(value: ClaimsSupported) -> Json {
        to_array(value.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcrValuesSupported(pub Vec<Acr>);

impl TypedParameter for AcrValuesSupported {
    const KEY: &'static str = "acr_values_supported";
}

impl TryFrom<Json> for AcrValuesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<AcrValuesSupported> for Json {
    fn from(value: AcrValuesSupported) -> Json {
        to_array(value.0.into_iter().map(|acr| acr.0).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayValuesSupported(pub Vec<Display>);

impl TypedParameter for DisplayValuesSupported {
    const KEY: &'static str = "display_values_supported";
}

impl TryFrom<Json> for DisplayValuesSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        array(value).map(Self)
    }
}

impl From<DisplayValuesSupported> for Json {
    fn from(value: DisplayValuesSupported) -> Json {
        to_array(value.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustFrameworksSupported(pub Vec<String>);

impl TypedParameter for TrustFrameworksSupported {
    const KEY: &'static str = "trust_frameworks_supported";
}

impl TryFrom<Json> for TrustFrameworksSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        strings(value).map(Self)
    }
}

impl From<TrustFrameworksSupported> for Json {
    fn from(value: TrustFrameworksSupported) -> Json {
        to_array(value.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsInVerifiedClaimsSupported(pub Vec<String>);

impl TypedParameter for ClaimsInVerifiedClaimsSupported {
    const KEY: &'static str = "claims_in_verified_claims_supported";
}

impl TryFrom<Json> for ClaimsInVerifiedClaimsSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        strings(value).map(Self)
    }
}

impl From<ClaimsInVerifiedClaimsSupported> for Json {
    fn from(value: ClaimsInVerifiedClaimsSupported) -> Json {
        to_array(value.0)
    }
}

/// `false` when not published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimsParameterSupported(pub bool);

impl TypedParameter for ClaimsParameterSupported {
    const KEY: &'static str = "claims_parameter_supported";
}

impl TryFrom<Json> for ClaimsParameterSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<ClaimsParameterSupported> for Json {
    fn from(value: ClaimsParameterSupported) -> Json {
        Json::Bool(value.0)
    }
}

/// `false` when not published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestParameterSupported(pub bool);

impl TypedParameter for RequestParameterSupported {
    const KEY: &'static str = "request_parameter_supported";
}

impl TryFrom<Json> for RequestParameterSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<RequestParameterSupported> for Json {
    fn from(value: RequestParameterSupported) -> Json {
        Json::Bool(value.0)
    }
}

/// `true` when not published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestUriParameterSupported(pub bool);

impl Default for RequestUriParameterSupported {
    fn default() -> Self {
        Self(true)
    }
}

impl TypedParameter for RequestUriParameterSupported {
    const KEY: &'static str = "request_uri_parameter_supported";
}

impl TryFrom<Json> for RequestUriParameterSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<RequestUriParameterSupported> for Json {
    fn from(value: RequestUriParameterSupported) -> Json {
        Json::Bool(value.0)
    }
}

/// `false` when not published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifiedClaimsSupported(pub bool);

impl TypedParameter for VerifiedClaimsSupported {
    const KEY: &'static str = "verified_claims_supported";
}

impl TryFrom<Json> for VerifiedClaimsSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<VerifiedClaimsSupported> for Json {
    fn from(value: VerifiedClaimsSupported) -> Json {
        Json::Bool(value.0)
    }
}

/// `false` when not published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackchannelLogoutSupported(pub bool);

impl TypedParameter for BackchannelLogoutSupported {
    const KEY: &'static str = "backchannel_logout_supported";
}

impl TryFrom<Json> for BackchannelLogoutSupported {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<BackchannelLogoutSupported> for Json {
    fn from(value: BackchannelLogoutSupported) -> Json {
        Json::Bool(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subject_types() {
        let supported: SubjectTypesSupported =
            json!(["public", "pairwise", "ephemeral"]).try_into().unwrap();
        assert_eq!(
            supported.0,
            vec![
                SubjectType::Public,
                SubjectType::Pairwise,
                SubjectType::Other("ephemeral".into())
            ]
        );
        assert_eq!(
            Json::from(supported),
            json!(["public", "pairwise", "ephemeral"])
        );
    }

    #[test]
    fn response_types_ignore_value_order() {
        let supported: ResponseTypesSupported =
            json!(["code", "id_token token", "code id_token"]).try_into().unwrap();
        assert!(supported.supports(&"token id_token".parse().unwrap()));
        assert!(!supported.supports(&"token".parse().unwrap()));
    }

    #[test]
    fn issuer_without_query() {
        assert!(Issuer::try_from(json!("https://server.example.com")).is_ok());
        assert!(Issuer::try_from(json!("https://server.example.com?x=1")).is_err());
    }

    #[test]
    fn defaults() {
        assert!(RequestUriParameterSupported::default().0);
        assert!(!ClaimsParameterSupported::default().0);
        assert_eq!(
            Json::from(ResponseModesSupported::default()),
            json!(["query", "fragment"])
        );
    }
}
