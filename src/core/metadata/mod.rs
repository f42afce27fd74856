use std::ops::Deref;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};

use self::parameters::provider::{
    AcrValuesSupported, AuthorizationEndpoint, BackchannelLogoutSupported,
    ClaimsInVerifiedClaimsSupported, ClaimsParameterSupported, ClaimsSupported,
    DisplayValuesSupported, IdTokenSigningAlgValuesSupported, Issuer, JwksUri,
    RequestParameterSupported, RequestUriParameterSupported, ResponseModesSupported,
    ResponseTypesSupported, ScopesSupported, SubjectTypesSupported, TokenEndpoint,
    TrustFrameworksSupported, UserinfoEndpoint, VerifiedClaimsSupported,
};

use super::{
    authorization_request::AuthenticationRequest,
    error::{AuthorizationRequestError, ErrorCode, ErrorObject},
    object::{ParsingErrorContext, TypedParameter, UntypedObject},
};

pub mod parameters;

/// OpenID Provider Metadata (OpenID Connect Discovery 1.0, Section 3).
///
/// The required members are parsed up front; optional members are read on demand and
/// fall back to their specified defaults. Unknown members are preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "UntypedObject", into = "UntypedObject")]
pub struct ProviderMetadata(
    UntypedObject,
    Issuer,
    AuthorizationEndpoint,
    JwksUri,
    ResponseTypesSupported,
    SubjectTypesSupported,
    IdTokenSigningAlgValuesSupported,
);

impl ProviderMetadata {
    pub fn new(
        issuer: Issuer,
        authorization_endpoint: AuthorizationEndpoint,
        jwks_uri: JwksUri,
        response_types_supported: ResponseTypesSupported,
        subject_types_supported: SubjectTypesSupported,
        id_token_signing_alg_values_supported: IdTokenSigningAlgValuesSupported,
        other: Option<UntypedObject>,
    ) -> Self {
        Self(
            other.unwrap_or_default(),
            issuer,
            authorization_endpoint,
            jwks_uri,
            response_types_supported,
            subject_types_supported,
            id_token_signing_alg_values_supported,
        )
    }

    pub fn issuer(&self) -> &Issuer {
        &self.1
    }

    pub fn authorization_endpoint(&self) -> &AuthorizationEndpoint {
        &self.2
    }

    pub fn jwks_uri(&self) -> &JwksUri {
        &self.3
    }

    pub fn response_types_supported(&self) -> &ResponseTypesSupported {
        &self.4
    }

    pub fn subject_types_supported(&self) -> &SubjectTypesSupported {
        &self.5
    }

    pub fn id_token_signing_alg_values_supported(&self) -> &IdTokenSigningAlgValuesSupported {
        &self.6
    }

    pub fn token_endpoint(&self) -> Option<Result<TokenEndpoint>> {
        self.0.get()
    }

    pub fn userinfo_endpoint(&self) -> Option<Result<UserinfoEndpoint>> {
        self.0.get()
    }

    pub fn response_modes_supported(&self) -> Result<ResponseModesSupported> {
        self.0
            .get_or_default::<ResponseModesSupported>()
            .parsing_error()
    }

    pub fn scopes_supported(&self) -> Option<Result<ScopesSupported>> {
        self.0.get()
    }

    pub fn claims_supported(&self) -> Option<Result<ClaimsSupported>> {
        self.0.get()
    }

    pub fn acr_values_supported(&self) -> Option<Result<AcrValuesSupported>> {
        self.0.get()
    }

    pub fn display_values_supported(&self) -> Option<Result<DisplayValuesSupported>> {
        self.0.get()
    }

    pub fn claims_parameter_supported(&self) -> Result<bool> {
        self.0
            .get_or_default::<ClaimsParameterSupported>()
            .parsing_error()
            .map(|s| s.0)
    }

    pub fn request_parameter_supported(&self) -> Result<bool> {
        self.0
            .get_or_default::<RequestParameterSupported>()
            .parsing_error()
            .map(|s| s.0)
    }

    pub fn request_uri_parameter_supported(&self) -> Result<bool> {
        self.0
            .get_or_default::<RequestUriParameterSupported>()
            .parsing_error()
            .map(|s| s.0)
    }

    pub fn verified_claims_supported(&self) -> Result<bool> {
        self.0
            .get_or_default::<VerifiedClaimsSupported>()
            .parsing_error()
            .map(|s| s.0)
    }

    pub fn trust_frameworks_supported(&self) -> Option<Result<TrustFrameworksSupported>> {
        self.0.get()
    }

    pub fn claims_in_verified_claims_supported(
        &self,
    ) -> Option<Result<ClaimsInVerifiedClaimsSupported>> {
        self.0.get()
    }

    pub fn backchannel_logout_supported(&self) -> Result<bool> {
        self.0
            .get_or_default::<BackchannelLogoutSupported>()
            .parsing_error()
            .map(|s| s.0)
    }

    /// Reject a request that uses a feature this provider does not advertise: its response
    /// type, the `claims`, `request` or `request_uri` parameters, or its `display` value.
    pub fn check_request(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<(), AuthorizationRequestError> {
        let reject = |message: String, code: ErrorCode| {
            Err(request.error(
                message.clone(),
                ErrorObject::new(code).with_description(message),
            ))
        };
        let support = |supported: Result<bool>| {
            supported.map_err(|e| {
                request.error(
                    format!("Invalid provider metadata: {e:#}"),
                    ErrorObject::new(ErrorCode::ServerError),
                )
            })
        };

        if !self.response_types_supported().supports(request.response_type()) {
            return reject(
                format!("Unsupported response type: {}", request.response_type()),
                ErrorCode::UnsupportedResponseType,
            );
        }
        if request.claims().is_some() && !support(self.claims_parameter_supported())? {
            return reject(
                "The \"claims\" parameter is not supported".into(),
                ErrorCode::InvalidRequest,
            );
        }
        if request.request_object().is_some() && !support(self.request_parameter_supported())? {
            return reject(
                "The \"request\" parameter is not supported".into(),
                ErrorCode::RequestNotSupported,
            );
        }
        if request.request_uri().is_some() && !support(self.request_uri_parameter_supported())? {
            return reject(
                "The \"request_uri\" parameter is not supported".into(),
                ErrorCode::RequestUriNotSupported,
            );
        }
        if let (Some(display), Some(supported)) = (request.display(), self.display_values_supported())
        {
            let supported = support(supported.map(|s| s.0.contains(&display)))?;
            if !supported {
                return reject(
                    format!("Unsupported \"display\" value: {display}"),
                    ErrorCode::InvalidRequest,
                );
            }
        }
        Ok(())
    }
}

impl From<ProviderMetadata> for UntypedObject {
    fn from(value: ProviderMetadata) -> Self {
        let mut inner = value.0;
        inner.insert(value.1);
        inner.insert(value.2);
        inner.insert(value.3);
        inner.insert(value.4);
        inner.insert(value.5);
        inner.insert(value.6);
        inner
    }
}

impl TryFrom<UntypedObject> for ProviderMetadata {
    type Error = Error;

    fn try_from(value: UntypedObject) -> Result<Self, Self::Error> {
        let issuer = value.get().parsing_error()?;
        let authorization_endpoint = value.get().parsing_error()?;
        let jwks_uri = value.get().parsing_error()?;
        let response_types_supported = value.get().parsing_error()?;
        let subject_types_supported = value.get().parsing_error()?;
        let id_token_signing_alg_values_supported = value.get().parsing_error()?;

        validate::<TokenEndpoint>(&value)?;
        validate::<UserinfoEndpoint>(&value)?;
        validate::<ResponseModesSupported>(&value)?;
        validate::<ScopesSupported>(&value)?;
        validate::<ClaimsSupported>(&value)?;
        validate::<AcrValuesSupported>(&value)?;
        validate::<DisplayValuesSupported>(&value)?;
        validate::<ClaimsParameterSupported>(&value)?;
        validate::<RequestParameterSupported>(&value)?;
        validate::<RequestUriParameterSupported>(&value)?;
        validate::<VerifiedClaimsSupported>(&value)?;
        validate::<TrustFrameworksSupported>(&value)?;
        validate::<ClaimsInVerifiedClaimsSupported>(&value)?;
        validate::<BackchannelLogoutSupported>(&value)?;

        Ok(Self(
            value,
            issuer,
            authorization_endpoint,
            jwks_uri,
            response_types_supported,
            subject_types_supported,
            id_token_signing_alg_values_supported,
        ))
    }
}

/// Fail when an optional member is present but malformed.
fn validate<T: TypedParameter>(object: &UntypedObject) -> Result<()> {
    if let Some(parsed) = object.get::<T>() {
        parsed.parsing_error()?;
    }
    Ok(())
}

impl Deref for ProviderMetadata {
    type Target = UntypedObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
