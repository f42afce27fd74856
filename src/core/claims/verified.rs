use serde_json::{Map, Value as Json};

use super::{ClaimsSet, ClaimsSetRequest};
use crate::core::error::ClaimsError;

const VERIFICATION: &str = "verification";
const CLAIMS: &str = "claims";
const TRUST_FRAMEWORK: &str = "trust_framework";

/// The `verification` member of a verified claims element: constraints on the trust
/// framework and evidence. Kept as an opaque JSON object; `null` members mean "any value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSpec(Map<String, Json>);

impl VerificationSpec {
    pub fn new(object: Map<String, Json>) -> Self {
        Self(object)
    }

    /// A verification spec requesting a specific trust framework.
    pub fn trust_framework(value: impl Into<String>) -> Self {
        let mut object = Map::new();
        object.insert(TRUST_FRAMEWORK.into(), Json::String(value.into()));
        Self(object)
    }

    pub fn as_object(&self) -> &Map<String, Json> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Json> {
        self.0
    }
}

impl Default for VerificationSpec {
    /// `{"trust_framework": null}`
    fn default() -> Self {
        let mut object = Map::new();
        object.insert(TRUST_FRAMEWORK.into(), Json::Null);
        Self(object)
    }
}

impl From<Map<String, Json>> for VerificationSpec {
    fn from(value: Map<String, Json>) -> Self {
        Self(value)
    }
}

/// One element of a `verified_claims` request (OpenID Connect for Identity Assurance):
/// the requested claims together with the verification they must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedClaimsSetRequest {
    verification: VerificationSpec,
    claims: ClaimsSetRequest,
}

impl VerifiedClaimsSetRequest {
    pub fn new(verification: VerificationSpec, claims: ClaimsSetRequest) -> Self {
        Self {
            verification,
            claims,
        }
    }

    pub fn with_verification(mut self, verification: VerificationSpec) -> Self {
        self.verification = verification;
        self
    }

    pub fn with_claims(mut self, claims: ClaimsSetRequest) -> Self {
        self.claims = claims;
        self
    }

    pub fn verification(&self) -> &VerificationSpec {
        &self.verification
    }

    pub fn claims(&self) -> &ClaimsSetRequest {
        &self.claims
    }

    /// `{"verification": {...}, "claims": {...}}`. Fails when there are no claims, since an
    /// empty `claims` member is not a valid request.
    pub fn to_json_object(&self) -> Result<Map<String, Json>, ClaimsError> {
        if self.claims.is_empty() {
            return Err(ClaimsError::EmptyVerificationClaims);
        }
        Ok(self.to_wire_object())
    }

    /// Callers guarantee a non-empty claim set.
    pub(crate) fn to_wire_object(&self) -> Map<String, Json> {
        let mut object = Map::new();
        object.insert(
            VERIFICATION.into(),
            Json::Object(self.verification.0.clone()),
        );
        object.insert(CLAIMS.into(), Json::Object(self.claims.to_json_object()));
        object
    }

    pub fn parse(object: &Map<String, Json>) -> Result<Self, ClaimsError> {
        if object.is_empty() {
            return Err(ClaimsError::EmptyVerifiedClaims);
        }
        let verification = match object.get(VERIFICATION) {
            Some(Json::Object(verification)) => VerificationSpec(verification.clone()),
            Some(_) => return Err(ClaimsError::NotAnObject(VERIFICATION.into())),
            None => return Err(ClaimsError::MissingVerification),
        };
        let claims = match object.get(CLAIMS) {
            Some(Json::Object(claims)) => ClaimsSetRequest::parse(claims)?,
            Some(Json::Null) | None => ClaimsSetRequest::default(),
            Some(_) => return Err(ClaimsError::NotAnObject(CLAIMS.into())),
        };
        // A nested `verified_claims` member is skipped, which can leave nothing requested.
        if claims.is_empty() {
            return Err(ClaimsError::EmptyVerificationClaims);
        }
        Ok(Self {
            verification,
            claims,
        })
    }

    /// Parse the value of a `verified_claims` member: a single object or an array of them,
    /// in array order. An empty `claims` member is reported as is, other failures as an
    /// invalid verified claims request.
    pub fn parse_list(value: &Json) -> Result<Vec<Self>, ClaimsError> {
        let wrap = |e: ClaimsError| match e {
            ClaimsError::EmptyVerificationClaims => e,
            e => ClaimsError::InvalidVerifiedClaims(Box::new(e)),
        };
        match value {
            Json::Object(object) => Ok(vec![Self::parse(object).map_err(wrap)?]),
            Json::Array(elements) if elements.is_empty() => {
                Err(wrap(ClaimsError::EmptyVerifiedClaims))
            }
            Json::Array(elements) => elements
                .iter()
                .map(|element| match element {
                    Json::Object(object) => Self::parse(object),
                    _ => Err(ClaimsError::NotAnObject("verified_claims element".into())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(wrap),
            _ => Err(wrap(ClaimsError::NotAnObject("verified_claims".into()))),
        }
    }
}

impl ClaimsSet for VerifiedClaimsSetRequest {
    fn claims_set(&self) -> &ClaimsSetRequest {
        &self.claims
    }

    fn map_claims_set<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ClaimsSetRequest) -> ClaimsSetRequest,
    {
        self.claims = f(self.claims);
        self
    }
}
