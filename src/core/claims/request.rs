use std::str::FromStr;

use anyhow::Error;
use serde_json::{Map, Value as Json};
use tracing::debug;

use super::{
    set::VERIFIED_CLAIMS, ClaimsSetRequest, CustomClaimsByScope, VerifiedClaimsSetRequest,
};
use crate::{
    config::Config,
    core::{
        authorization_request::{
            parameters::{ResponseType, ResponseTypeValue, Scope},
            AuthenticationRequest,
        },
        error::ClaimsError,
        object::TypedParameter,
    },
};

const ID_TOKEN: &str = "id_token";
const USERINFO: &str = "userinfo";

/// Whether claims are delivered in the ID token rather than from the UserInfo endpoint.
///
/// This is the case when an ID token is returned but no access token is issued, i.e. for
/// `response_type=id_token` (OpenID Connect Core 1.0, Section 5.4).
pub fn delivers_claims_via_id_token(response_type: &ResponseType) -> bool {
    response_type.contains(&ResponseTypeValue::IdToken)
        && !response_type.contains(&ResponseTypeValue::Code)
        && !response_type.contains(&ResponseTypeValue::Token)
}

/// The claims requested from one target, the ID token or the UserInfo response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Side {
    claims: Option<ClaimsSetRequest>,
    verified: Vec<VerifiedClaimsSetRequest>,
}

impl Side {
    fn is_empty(&self) -> bool {
        self.claims.is_none() && self.verified.is_empty()
    }

    fn with_claims(mut self, claims: ClaimsSetRequest) -> Self {
        self.claims = (!claims.is_empty()).then_some(claims);
        self
    }

    fn add_verified(
        mut self,
        verified: VerifiedClaimsSetRequest,
    ) -> Result<Self, ClaimsError> {
        if verified.claims().is_empty() {
            return Err(ClaimsError::EmptyVerificationClaims);
        }
        self.verified.push(verified);
        Ok(self)
    }

    fn add(mut self, other: &Side) -> Self {
        self.claims = match (self.claims, &other.claims) {
            (Some(claims), Some(other)) => Some(claims.merge(other)),
            (None, Some(other)) => Some(other.clone()),
            (claims, None) => claims,
        };
        self.verified.extend(other.verified.iter().cloned());
        self
    }

    fn to_json_object(&self) -> Map<String, Json> {
        let mut object = self
            .claims
            .as_ref()
            .map(ClaimsSetRequest::to_json_object)
            .unwrap_or_default();
        match self.verified.as_slice() {
            [] => {}
            [single] => {
                object.insert(VERIFIED_CLAIMS.into(), Json::Object(single.to_wire_object()));
            }
            many => {
                let elements = many
                    .iter()
                    .map(|v| Json::Object(v.to_wire_object()))
                    .collect();
                object.insert(VERIFIED_CLAIMS.into(), Json::Array(elements));
            }
        }
        object
    }

    fn parse(name: &str, value: &Json) -> Result<Self, ClaimsError> {
        let object = match value {
            Json::Object(object) => object,
            _ => return Err(ClaimsError::NotAnObject(name.into())),
        };
        let claims = ClaimsSetRequest::parse(object)?;
        if claims.is_empty() && !object.contains_key(VERIFIED_CLAIMS) {
            debug!("the {name} claims request is empty, treating it as absent");
        }
        let verified = match object.get(VERIFIED_CLAIMS) {
            Some(value) => VerifiedClaimsSetRequest::parse_list(value)?,
            None => Vec::new(),
        };
        Ok(Self {
            verified,
            ..Self::default().with_claims(claims)
        })
    }
}

/// The value of the `claims` request parameter (OpenID Connect Core 1.0, Section 5.5),
/// with the `verified_claims` extension of OpenID Connect for Identity Assurance.
///
/// ```
/// use openid_messages::core::claims::{ClaimsRequest, ClaimsSet};
///
/// let request: ClaimsRequest =
///     r#"{"userinfo": {"email": {"essential": true}}}"#.parse().unwrap();
/// assert!(request.userinfo_claims().unwrap().entry("email", None).unwrap().is_essential());
/// assert!(request.id_token_claims().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsRequest {
    id_token: Side,
    userinfo: Side,
}

impl ClaimsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id_token.is_empty() && self.userinfo.is_empty()
    }

    pub fn id_token_claims(&self) -> Option<&ClaimsSetRequest> {
        self.id_token.claims.as_ref()
    }

    pub fn userinfo_claims(&self) -> Option<&ClaimsSetRequest> {
        self.userinfo.claims.as_ref()
    }

    pub fn id_token_verified_claims(&self) -> &[VerifiedClaimsSetRequest] {
        &self.id_token.verified
    }

    pub fn userinfo_verified_claims(&self) -> &[VerifiedClaimsSetRequest] {
        &self.userinfo.verified
    }

    /// Replace the plain ID token claims. An empty set leaves the ID token side without
    /// plain claims.
    pub fn with_id_token_claims(mut self, claims: ClaimsSetRequest) -> Self {
        self.id_token = self.id_token.with_claims(claims);
        self
    }

    /// Replace the plain UserInfo claims. An empty set leaves the UserInfo side without
    /// plain claims.
    pub fn with_userinfo_claims(mut self, claims: ClaimsSetRequest) -> Self {
        self.userinfo = self.userinfo.with_claims(claims);
        self
    }

    /// Append a verified claims element to the ID token side.
    pub fn add_id_token_verified_claims(
        mut self,
        verified: VerifiedClaimsSetRequest,
    ) -> Result<Self, ClaimsError> {
        self.id_token = self.id_token.add_verified(verified)?;
        Ok(self)
    }

    /// Append a verified claims element to the UserInfo side.
    pub fn add_userinfo_verified_claims(
        mut self,
        verified: VerifiedClaimsSetRequest,
    ) -> Result<Self, ClaimsError> {
        self.userinfo = self.userinfo.add_verified(verified)?;
        Ok(self)
    }

    /// Combine with another claims request.
    ///
    /// Plain claims are merged entry by entry (see [ClaimsSetRequest::merge]); the verified
    /// claims elements of `other` are appended after those of `self`.
    pub fn add(mut self, other: &ClaimsRequest) -> Self {
        self.id_token = self.id_token.add(&other.id_token);
        self.userinfo = self.userinfo.add(&other.userinfo);
        self
    }

    /// The wire form. A side without any claims is omitted; a single verified claims
    /// element is rendered as an object and several as an array.
    pub fn to_json_object(&self) -> Map<String, Json> {
        let mut object = Map::new();
        if !self.id_token.is_empty() {
            object.insert(ID_TOKEN.into(), Json::Object(self.id_token.to_json_object()));
        }
        if !self.userinfo.is_empty() {
            object.insert(USERINFO.into(), Json::Object(self.userinfo.to_json_object()));
        }
        object
    }

    pub fn to_json_string(&self) -> String {
        Json::Object(self.to_json_object()).to_string()
    }

    /// Parse a claims request from a JSON object or from a string holding one.
    ///
    /// A side given as an empty object is treated as absent. Members other than `id_token`
    /// and `userinfo` are ignored.
    pub fn parse(value: &Json) -> Result<Self, ClaimsError> {
        Self::parse_inner(value).map_err(|e| ClaimsError::InvalidClaimsObject(Box::new(e)))
    }

    fn parse_inner(value: &Json) -> Result<Self, ClaimsError> {
        let object = match value {
            Json::String(s) => return Self::parse_inner(&serde_json::from_str(s)?),
            Json::Object(object) => object,
            _ => return Err(ClaimsError::NotAnObject("claims".into())),
        };
        let side = |name: &str| {
            object
                .get(name)
                .map(|value| Side::parse(name, value))
                .transpose()
                .map(Option::unwrap_or_default)
        };
        let request = Self {
            id_token: side(ID_TOKEN)?,
            userinfo: side(USERINFO)?,
        };
        for key in object.keys() {
            if key != ID_TOKEN && key != USERINFO {
                debug!("ignoring unknown claims request member '{key}'");
            }
        }
        Ok(request)
    }

    /// Resolve the claims to release for an authorization request.
    ///
    /// Requests without the `openid` scope value, or whose response type requests neither a
    /// code nor an ID token, are not OpenID Connect requests and resolve to an empty claims
    /// request. Otherwise the claims implied by the scope are routed to the ID token when
    /// [delivers_claims_via_id_token] holds and to the UserInfo response otherwise, and the
    /// explicit `claims_request` is added on top of them.
    pub fn resolve(
        response_type: &ResponseType,
        scope: Option<&Scope>,
        claims_request: Option<&ClaimsRequest>,
        custom_claims: Option<&CustomClaimsByScope>,
    ) -> Self {
        let Some(scope) = scope.filter(|scope| scope.contains_openid()) else {
            debug!("no openid scope value, not resolving any claims");
            return Self::default();
        };
        if !response_type.is_openid() {
            debug!("response type '{response_type}' does not deliver OpenID Connect claims");
            return Self::default();
        }

        let scope_claims = ClaimsSetRequest::resolve(scope, custom_claims);
        let resolved = if delivers_claims_via_id_token(response_type) {
            Self::default().with_id_token_claims(scope_claims)
        } else {
            Self::default().with_userinfo_claims(scope_claims)
        };
        match claims_request {
            Some(claims_request) => resolved.add(claims_request),
            None => resolved,
        }
    }

    /// [ClaimsRequest::resolve] with the response type, scope and `claims` parameter of the
    /// request.
    pub fn resolve_for(
        request: &AuthenticationRequest,
        custom_claims: Option<&CustomClaimsByScope>,
    ) -> Self {
        Self::resolve(
            request.response_type(),
            Some(request.scope()),
            request.claims(),
            custom_claims,
        )
    }

    /// [ClaimsRequest::resolve_for] with the custom scope claims of the configuration.
    pub fn resolve_with_config(request: &AuthenticationRequest, config: &Config) -> Self {
        Self::resolve_for(request, Some(&config.custom_claims))
    }
}

impl FromStr for ClaimsRequest {
    type Err = ClaimsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&Json::String(s.to_owned()))
    }
}

impl TypedParameter for ClaimsRequest {
    const KEY: &'static str = "claims";
}

impl TryFrom<Json> for ClaimsRequest {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self::parse(&value)?)
    }
}

impl From<ClaimsRequest> for Json {
    fn from(value: ClaimsRequest) -> Self {
        Json::Object(value.to_json_object())
    }
}
