use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value as Json;
use url::Url;

use self::parameters::{
    AcrValues, ClaimsLocales, ClientId, CodeChallenge, CodeChallengeMethod, Display,
    IdTokenHint, IncludeGrantedScopes, LoginHint, MaxAge, Nonce, Prompt, RedirectUri,
    RequestObject, RequestUri, Resource, ResponseMode, ResponseType, Scope, State, UiLocales,
};

use super::{
    claims::ClaimsRequest,
    error::{AuthorizationRequestError, ErrorObject},
    object::{TypedParameter, UntypedObject},
};

pub mod builder;
pub mod parameters;
pub mod request_object;

pub use builder::AuthenticationRequestBuilder;

/// Parameters with a dedicated field; everything else is kept as a custom parameter.
const REGISTERED_PARAMETERS: &[&str] = &[
    ResponseType::KEY,
    ClientId::KEY,
    RedirectUri::KEY,
    Scope::KEY,
    State::KEY,
    ResponseMode::KEY,
    Nonce::KEY,
    Display::KEY,
    Prompt::KEY,
    MaxAge::KEY,
    UiLocales::KEY,
    ClaimsLocales::KEY,
    IdTokenHint::KEY,
    LoginHint::KEY,
    AcrValues::KEY,
    ClaimsRequest::KEY,
    RequestObject::KEY,
    RequestUri::KEY,
    CodeChallenge::KEY,
    CodeChallengeMethod::KEY,
    Resource::KEY,
    IncludeGrantedScopes::KEY,
];

/// An OpenID Connect Authentication Request (OpenID Connect Core 1.0, Section 3.1.2.1).
///
/// Created by parsing the parameters received at the authorization endpoint, or with an
/// [AuthenticationRequestBuilder] on the client side.
///
/// ```
/// use openid_messages::core::authorization_request::AuthenticationRequest;
///
/// let request = AuthenticationRequest::from_query(
///     "response_type=code&client_id=s6BhdRkqt3&scope=openid%20email\
///      &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb&state=af0ifjsldkj",
/// )
/// .unwrap();
///
/// assert_eq!(request.client_id().0, "s6BhdRkqt3");
/// assert!(request.scope().contains("email"));
/// assert_eq!(request.response_mode().to_string(), "query");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticationRequest {
    endpoint: Option<Url>,
    response_type: ResponseType,
    client_id: ClientId,
    redirect_uri: Option<Url>,
    scope: Scope,
    state: Option<State>,
    response_mode: Option<ResponseMode>,
    nonce: Option<Nonce>,
    display: Option<Display>,
    prompt: Option<Prompt>,
    max_age: Option<MaxAge>,
    ui_locales: Option<UiLocales>,
    claims_locales: Option<ClaimsLocales>,
    id_token_hint: Option<IdTokenHint>,
    login_hint: Option<LoginHint>,
    acr_values: Option<AcrValues>,
    claims: Option<ClaimsRequest>,
    request_object: Option<RequestObject>,
    request_uri: Option<RequestUri>,
    code_challenge: Option<CodeChallenge>,
    code_challenge_method: Option<CodeChallengeMethod>,
    resource: Option<Resource>,
    include_granted_scopes: Option<IncludeGrantedScopes>,
    custom_parameters: UntypedObject,
}

/// What is known about the request so far, echoed in every parse error.
#[derive(Debug, Default)]
struct Echo {
    client_id: Option<ClientId>,
    redirect_uri: Option<Url>,
    state: Option<State>,
    response_mode: Option<ResponseMode>,
}

impl Echo {
    fn error(&self, error: AuthorizationRequestError) -> AuthorizationRequestError {
        error
            .with_client_id(self.client_id.clone())
            .with_redirect_uri(self.redirect_uri.clone())
            .with_state(self.state.clone())
            .with_response_mode(self.response_mode.clone())
    }

    fn invalid_request(&self, message: impl Into<String>) -> AuthorizationRequestError {
        self.error(AuthorizationRequestError::invalid_request(message))
    }

    /// Parse an optional parameter, reporting `Invalid "<key>" parameter: <detail>`.
    fn optional<T: TypedParameter>(
        &self,
        params: &UntypedObject,
    ) -> Result<Option<T>, AuthorizationRequestError> {
        params
            .get::<T>()
            .transpose()
            .map_err(|e| self.invalid_request(format!("Invalid \"{}\" parameter: {e:#}", T::KEY)))
    }

    fn required<T: TypedParameter>(
        &self,
        params: &UntypedObject,
    ) -> Result<T, AuthorizationRequestError> {
        self.optional(params)?
            .ok_or_else(|| self.invalid_request(format!("Missing \"{}\" parameter", T::KEY)))
    }
}

impl AuthenticationRequest {
    /// Start building a request on the client side.
    pub fn builder(
        response_type: ResponseType,
        scope: Scope,
        client_id: ClientId,
        redirect_uri: Option<Url>,
    ) -> AuthenticationRequestBuilder {
        AuthenticationRequestBuilder::new(response_type, scope, client_id, redirect_uri)
    }

    /// Parse and validate the parameters of an authentication request.
    ///
    /// Parameters may be strings (from a query string or form body) or typed JSON values
    /// (from the claims of a request object). Every failure is an `invalid_request` error
    /// carrying the client ID, redirect URI, state and response mode parsed up to that
    /// point, the response mode being the one implied by the response type unless given
    /// explicitly.
    pub fn parse(
        endpoint: Option<Url>,
        mut params: UntypedObject,
    ) -> Result<Self, AuthorizationRequestError> {
        let mut echo = Echo::default();

        let client_id: ClientId = echo.required(&params)?;
        echo.client_id = Some(client_id.clone());
        echo.state = echo.optional::<State>(&params)?;
        echo.redirect_uri = echo.optional::<RedirectUri>(&params)?.map(|uri| uri.0);
        let response_mode = echo.optional::<ResponseMode>(&params)?;
        echo.response_mode = response_mode.clone();

        let response_type: ResponseType = echo.required(&params)?;
        echo.response_mode = Some(
            response_mode
                .clone()
                .unwrap_or_else(|| response_type.implied_response_mode()),
        );

        let request_object = echo.optional::<RequestObject>(&params)?;
        let request_uri = echo.optional::<RequestUri>(&params)?;
        let by_request_object = match (&request_object, &request_uri) {
            (Some(_), Some(_)) => {
                return Err(echo.invalid_request(
                    "The \"request\" and \"request_uri\" parameters must not be used together",
                ))
            }
            (None, None) => false,
            _ => true,
        };

        if echo.redirect_uri.is_none() && !by_request_object {
            return Err(echo.invalid_request("Missing \"redirect_uri\" parameter"));
        }

        let scope: Scope = echo.required(&params)?;
        if !scope.contains_openid() {
            return Err(echo.invalid_request("The scope must include an \"openid\" value"));
        }

        let nonce = echo.optional::<Nonce>(&params)?;
        if nonce.is_none()
            && !by_request_object
            && (response_type.implies_implicit_flow() || response_type.implies_hybrid_flow())
        {
            return Err(echo.invalid_request(
                "Missing \"nonce\" parameter: Required in the implicit and hybrid flows",
            ));
        }

        let claims = match params.get_raw(ClaimsRequest::KEY) {
            Some(value) => Some(ClaimsRequest::parse(value).map_err(|e| {
                echo.invalid_request(format!("Invalid \"{}\" parameter: {e}", ClaimsRequest::KEY))
            })?),
            None => None,
        };

        let request = Self {
            endpoint,
            display: echo.optional(&params)?,
            prompt: echo.optional(&params)?,
            max_age: echo.optional(&params)?,
            ui_locales: echo.optional(&params)?,
            claims_locales: echo.optional(&params)?,
            id_token_hint: echo.optional(&params)?,
            login_hint: echo.optional(&params)?,
            acr_values: echo.optional(&params)?,
            code_challenge: echo.optional(&params)?,
            code_challenge_method: echo.optional(&params)?,
            resource: echo.optional(&params)?,
            include_granted_scopes: echo.optional(&params)?,
            client_id,
            redirect_uri: echo.redirect_uri.take(),
            state: echo.state.take(),
            response_type,
            response_mode,
            scope,
            nonce,
            claims,
            request_object,
            request_uri,
            custom_parameters: {
                for key in REGISTERED_PARAMETERS {
                    params.0.remove(*key);
                }
                params
            },
        };
        Ok(request)
    }

    /// Parse from `application/x-www-form-urlencoded` parameters.
    pub fn from_query(query: &str) -> Result<Self, AuthorizationRequestError> {
        let params = UntypedObject::from_query(query)
            .map_err(|e| AuthorizationRequestError::invalid_request(format!("{e:#}")))?;
        Self::parse(None, params)
    }

    /// Parse from the full request URI; the URI without its query is kept as the endpoint.
    pub fn from_url(url: &Url) -> Result<Self, AuthorizationRequestError> {
        let params = UntypedObject::from_query(url.query().unwrap_or_default())
            .map_err(|e| AuthorizationRequestError::invalid_request(format!("{e:#}")))?;
        let mut endpoint = url.clone();
        endpoint.set_query(None);
        endpoint.set_fragment(None);
        Self::parse(Some(endpoint), params)
    }

    /// All parameters of the request, custom parameters included.
    pub fn to_parameters(&self) -> UntypedObject {
        let mut params = self.custom_parameters.clone();
        let _ = params.insert(self.response_type.clone());
        let _ = params.insert(self.client_id.clone());
        params.insert_opt(self.redirect_uri.clone().map(RedirectUri));
        let _ = params.insert(self.scope.clone());
        params.insert_opt(self.state.clone());
        params.insert_opt(self.response_mode.clone());
        params.insert_opt(self.nonce.clone());
        params.insert_opt(self.display);
        params.insert_opt(self.prompt.clone());
        params.insert_opt(self.max_age);
        params.insert_opt(self.ui_locales.clone());
        params.insert_opt(self.claims_locales.clone());
        params.insert_opt(self.id_token_hint.clone());
        params.insert_opt(self.login_hint.clone());
        params.insert_opt(self.acr_values.clone());
        params.insert_opt(self.claims.clone().filter(|claims| !claims.is_empty()));
        params.insert_opt(self.request_object.clone());
        params.insert_opt(self.request_uri.clone());
        params.insert_opt(self.code_challenge.clone());
        params.insert_opt(self.code_challenge_method.clone());
        params.insert_opt(self.resource.clone());
        params.insert_opt(self.include_granted_scopes);
        params
    }

    /// Encode as `application/x-www-form-urlencoded` parameters.
    pub fn to_query(&self) -> Result<String> {
        self.to_parameters().to_query()
    }

    /// Encode as [Url], using the `authorization_endpoint` as a base.
    pub fn to_url(&self, authorization_endpoint: Option<&Url>) -> Result<Url> {
        let mut url = authorization_endpoint
            .or(self.endpoint.as_ref())
            .cloned()
            .ok_or(anyhow!("no authorization endpoint to encode the request against"))?;
        if url.query().is_some() {
            bail!("the authorization endpoint must not have a query: {url}")
        }
        let query = self
            .to_query()
            .context("unable to encode Authentication Request")?;
        url.set_query(Some(&query));
        Ok(url)
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub fn response_type(&self) -> &ResponseType {
        &self.response_type
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> Option<&Url> {
        self.redirect_uri.as_ref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// The explicit `response_mode`, or the one implied by the response type.
    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
            .clone()
            .unwrap_or_else(|| self.response_type.implied_response_mode())
    }

    pub fn explicit_response_mode(&self) -> Option<&ResponseMode> {
        self.response_mode.as_ref()
    }

    pub fn nonce(&self) -> Option<&Nonce> {
        self.nonce.as_ref()
    }

    /// The `display` parameter; `page` applies when absent.
    pub fn display(&self) -> Option<Display> {
        self.display
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn max_age(&self) -> Option<MaxAge> {
        self.max_age
    }

    pub fn ui_locales(&self) -> Option<&UiLocales> {
        self.ui_locales.as_ref()
    }

    pub fn claims_locales(&self) -> Option<&ClaimsLocales> {
        self.claims_locales.as_ref()
    }

    pub fn id_token_hint(&self) -> Option<&IdTokenHint> {
        self.id_token_hint.as_ref()
    }

    pub fn login_hint(&self) -> Option<&LoginHint> {
        self.login_hint.as_ref()
    }

    pub fn acr_values(&self) -> Option<&AcrValues> {
        self.acr_values.as_ref()
    }

    /// The `claims` parameter as received, before any resolution against the scope.
    pub fn claims(&self) -> Option<&ClaimsRequest> {
        self.claims.as_ref()
    }

    pub fn request_object(&self) -> Option<&RequestObject> {
        self.request_object.as_ref()
    }

    pub fn request_uri(&self) -> Option<&RequestUri> {
        self.request_uri.as_ref()
    }

    pub fn code_challenge(&self) -> Option<&CodeChallenge> {
        self.code_challenge.as_ref()
    }

    /// The PKCE method; `plain` when a challenge is given without a method.
    pub fn code_challenge_method(&self) -> Option<CodeChallengeMethod> {
        self.code_challenge.as_ref()?;
        Some(self.code_challenge_method.clone().unwrap_or_default())
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn include_granted_scopes(&self) -> bool {
        self.include_granted_scopes.is_some_and(|i| i.0)
    }

    pub fn custom_parameters(&self) -> &UntypedObject {
        &self.custom_parameters
    }

    pub fn custom_parameter(&self, key: &str) -> Option<&Json> {
        self.custom_parameters.get_raw(key)
    }

    /// An error response to this request, to be returned through its redirect URI.
    pub fn error(
        &self,
        message: impl Into<String>,
        error_object: ErrorObject,
    ) -> AuthorizationRequestError {
        AuthorizationRequestError::new(message, error_object)
            .with_client_id(Some(self.client_id.clone()))
            .with_redirect_uri(self.redirect_uri.clone())
            .with_state(self.state.clone())
            .with_response_mode(Some(self.response_mode()))
    }
}
