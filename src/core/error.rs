use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use super::authorization_request::parameters::{ClientId, ResponseMode, State};

const INVALID_REQUEST: &str = "invalid_request";
const UNAUTHORIZED_CLIENT: &str = "unauthorized_client";
const ACCESS_DENIED: &str = "access_denied";
const UNSUPPORTED_RESPONSE_TYPE: &str = "unsupported_response_type";
const INVALID_SCOPE: &str = "invalid_scope";
const SERVER_ERROR: &str = "server_error";
const TEMPORARILY_UNAVAILABLE: &str = "temporarily_unavailable";
const LOGIN_REQUIRED: &str = "login_required";
const CONSENT_REQUIRED: &str = "consent_required";
const INTERACTION_REQUIRED: &str = "interaction_required";
const REQUEST_NOT_SUPPORTED: &str = "request_not_supported";
const REQUEST_URI_NOT_SUPPORTED: &str = "request_uri_not_supported";
const INVALID_REQUEST_OBJECT: &str = "invalid_request_object";

/// OAuth 2.0 and OpenID Connect authorization error codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ErrorCode {
    InvalidRequest,
    UnauthorizedClient,
    AccessDenied,
    UnsupportedResponseType,
    InvalidScope,
    ServerError,
    TemporarilyUnavailable,
    LoginRequired,
    ConsentRequired,
    InteractionRequired,
    RequestNotSupported,
    RequestUriNotSupported,
    InvalidRequestObject,
    Other(String),
}

impl From<String> for ErrorCode {
    fn from(s: String) -> Self {
        match s.as_str() {
            INVALID_REQUEST => ErrorCode::InvalidRequest,
            UNAUTHORIZED_CLIENT => ErrorCode::UnauthorizedClient,
            ACCESS_DENIED => ErrorCode::AccessDenied,
            UNSUPPORTED_RESPONSE_TYPE => ErrorCode::UnsupportedResponseType,
            INVALID_SCOPE => ErrorCode::InvalidScope,
            SERVER_ERROR => ErrorCode::ServerError,
            TEMPORARILY_UNAVAILABLE => ErrorCode::TemporarilyUnavailable,
            LOGIN_REQUIRED => ErrorCode::LoginRequired,
            CONSENT_REQUIRED => ErrorCode::ConsentRequired,
            INTERACTION_REQUIRED => ErrorCode::InteractionRequired,
            REQUEST_NOT_SUPPORTED => ErrorCode::RequestNotSupported,
            REQUEST_URI_NOT_SUPPORTED => ErrorCode::RequestUriNotSupported,
            INVALID_REQUEST_OBJECT => ErrorCode::InvalidRequestObject,
            _ => ErrorCode::Other(s),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Other(o) => o,
            known => known.to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidRequest => INVALID_REQUEST,
            ErrorCode::UnauthorizedClient => UNAUTHORIZED_CLIENT,
            ErrorCode::AccessDenied => ACCESS_DENIED,
            ErrorCode::UnsupportedResponseType => UNSUPPORTED_RESPONSE_TYPE,
            ErrorCode::InvalidScope => INVALID_SCOPE,
            ErrorCode::ServerError => SERVER_ERROR,
            ErrorCode::TemporarilyUnavailable => TEMPORARILY_UNAVAILABLE,
            ErrorCode::LoginRequired => LOGIN_REQUIRED,
            ErrorCode::ConsentRequired => CONSENT_REQUIRED,
            ErrorCode::InteractionRequired => INTERACTION_REQUIRED,
            ErrorCode::RequestNotSupported => REQUEST_NOT_SUPPORTED,
            ErrorCode::RequestUriNotSupported => REQUEST_URI_NOT_SUPPORTED,
            ErrorCode::InvalidRequestObject => INVALID_REQUEST_OBJECT,
            ErrorCode::Other(o) => o,
        }
        .fmt(f)
    }
}

/// The error members of an OAuth 2.0 error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(rename = "error")]
    code: ErrorCode,
    #[serde(rename = "error_description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "error_uri", skip_serializing_if = "Option::is_none")]
    uri: Option<Url>,
}

impl ErrorObject {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            description: None,
            uri: None,
        }
    }

    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest).with_description("Invalid request")
    }

    pub fn access_denied() -> Self {
        Self::new(ErrorCode::AccessDenied)
            .with_description("Access denied by resource owner or authorization server")
    }

    pub fn unsupported_response_type() -> Self {
        Self::new(ErrorCode::UnsupportedResponseType)
            .with_description("Unsupported response type")
    }

    pub fn invalid_request_object() -> Self {
        Self::new(ErrorCode::InvalidRequestObject).with_description("Invalid request object")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append detail to the current description, as in `Invalid request: <detail>`.
    pub fn append_description(self, detail: impl fmt::Display) -> Self {
        let description = match &self.description {
            Some(d) => format!("{d}: {detail}"),
            None => detail.to_string(),
        };
        self.with_description(description)
    }

    pub fn with_uri(mut self, uri: Url) -> Self {
        self.uri = Some(uri);
        self
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    fn to_pairs(&self, state: Option<&State>) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("error", self.code.to_string())];
        if let Some(description) = &self.description {
            pairs.push(("error_description", description.clone()));
        }
        if let Some(uri) = &self.uri {
            pairs.push(("error_uri", uri.to_string()));
        }
        if let Some(state) = state {
            pairs.push(("state", state.0.clone()));
        }
        pairs
    }

    /// Encode this error into the redirect URI as an authorization error response.
    ///
    /// Only the `query` and `fragment` response modes can be expressed as a redirect URI.
    pub fn to_redirect_url(
        &self,
        redirect_uri: &Url,
        response_mode: &ResponseMode,
        state: Option<&State>,
    ) -> Result<Url> {
        let mut url = redirect_uri.clone();
        let pairs = self.to_pairs(state);
        match response_mode {
            ResponseMode::Query => {
                url.query_pairs_mut().extend_pairs(pairs);
            }
            ResponseMode::Fragment => {
                let encoded = serde_urlencoded::to_string(pairs)?;
                url.set_fragment(Some(&encoded));
            }
            other => bail!("response mode '{other}' cannot be encoded in a redirect URI"),
        }
        Ok(url)
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.code),
            None => self.code.fmt(f),
        }
    }
}

/// A failure to parse or accept an authorization request.
///
/// Besides the log message and the [ErrorObject], carries whatever was already known about
/// the request when the failure occurred so that an error response can be sent back to the
/// client through the right channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AuthorizationRequestError {
    message: String,
    error_object: ErrorObject,
    client_id: Option<ClientId>,
    redirect_uri: Option<Url>,
    state: Option<State>,
    response_mode: Option<ResponseMode>,
}

impl AuthorizationRequestError {
    pub fn new(message: impl Into<String>, error_object: ErrorObject) -> Self {
        Self {
            message: message.into(),
            error_object,
            client_id: None,
            redirect_uri: None,
            state: None,
            response_mode: None,
        }
    }

    /// An `invalid_request` error whose description is `Invalid request: <message>`.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        let message = message.into();
        let error_object = ErrorObject::invalid_request().append_description(&message);
        Self::new(message, error_object)
    }

    pub fn with_client_id(mut self, client_id: Option<ClientId>) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: Option<Url>) -> Self {
        self.redirect_uri = redirect_uri;
        self
    }

    pub fn with_state(mut self, state: Option<State>) -> Self {
        self.state = state;
        self
    }

    pub fn with_response_mode(mut self, response_mode: Option<ResponseMode>) -> Self {
        self.response_mode = response_mode;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_object(&self) -> &ErrorObject {
        &self.error_object
    }

    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    pub fn redirect_uri(&self) -> Option<&Url> {
        self.redirect_uri.as_ref()
    }

    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    pub fn response_mode(&self) -> Option<&ResponseMode> {
        self.response_mode.as_ref()
    }

    /// The error response redirect, when both a redirect URI and a response mode are known.
    pub fn to_redirect_url(&self) -> Option<Result<Url>> {
        let redirect_uri = self.redirect_uri.as_ref()?;
        let response_mode = self.response_mode.as_ref()?;
        Some(
            self.error_object
                .to_redirect_url(redirect_uri, response_mode, self.state.as_ref()),
        )
    }
}

/// Structural errors in a claims request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    /// Any failure to parse the top-level claims request.
    #[error("Invalid claims object: {0}")]
    InvalidClaimsObject(Box<ClaimsError>),

    /// The `verified_claims` member itself is malformed.
    #[error("Invalid verified claims request: {0}")]
    InvalidVerifiedClaims(Box<ClaimsError>),

    /// The `claims` member of a verified claims element is absent or empty.
    #[error("Empty verification claims object")]
    EmptyVerificationClaims,

    /// A `verified_claims` member that is an empty object or array.
    #[error("Empty verified claims object")]
    EmptyVerifiedClaims,

    #[error("Missing verification object")]
    MissingVerification,

    #[error("The {0} member must be a JSON object")]
    NotAnObject(String),

    #[error("Empty claim name")]
    EmptyClaimName,

    #[error("Invalid \"{member}\" member of claim {claim}: {reason}")]
    InvalidMember {
        claim: String,
        member: &'static str,
        reason: String,
    },

    #[error("\"{0}\" is a reserved member and cannot be set as additional information")]
    ReservedMember(String),

    #[error("The purpose must be between {min} and {max} characters long, found {found}")]
    InvalidPurposeLength {
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("Invalid JSON: {0}")]
    Json(String),
}

impl ClaimsError {
    /// The innermost error, with the `Invalid ...` wrappers removed.
    pub fn root(&self) -> &ClaimsError {
        match self {
            ClaimsError::InvalidClaimsObject(inner) | ClaimsError::InvalidVerifiedClaims(inner) => {
                inner.root()
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for ClaimsError {
    fn from(value: serde_json::Error) -> Self {
        ClaimsError::Json(value.to_string())
    }
}
