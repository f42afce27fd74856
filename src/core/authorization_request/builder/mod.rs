use anyhow::{bail, Result};
use serde_json::Value as Json;
use tracing::warn;
use url::Url;

use crate::core::{
    authorization_request::{
        parameters::{
            AcrValues, ClaimsLocales, ClientId, CodeChallenge, CodeChallengeMethod, Display,
            IdTokenHint, IncludeGrantedScopes, LoginHint, MaxAge, Nonce, Prompt, RequestObject,
            RequestUri, Resource, ResponseMode, ResponseType, Scope, State, UiLocales,
        },
        AuthenticationRequest, REGISTERED_PARAMETERS,
    },
    claims::ClaimsRequest,
    object::UntypedObject,
};

/// Builds an [AuthenticationRequest] on the client side.
///
/// Unlike [AuthenticationRequest::parse], which reports protocol errors for requests received
/// over the wire, [build](AuthenticationRequestBuilder::build) fails on requests that no
/// correct client would construct.
///
/// ```
/// use openid_messages::core::authorization_request::{
///     parameters::{ClientId, Nonce, ResponseType, Scope},
///     AuthenticationRequest,
/// };
///
/// let request = AuthenticationRequest::builder(
///     "id_token".parse().unwrap(),
///     Scope::new(["openid", "profile"]),
///     ClientId("s6BhdRkqt3".into()),
///     Some("https://client.example.org/cb".parse().unwrap()),
/// )
/// .with_nonce(Nonce::random())
/// .build()
/// .unwrap();
///
/// assert!(request.to_query().unwrap().contains("response_type=id_token"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticationRequestBuilder {
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

impl AuthenticationRequestBuilder {
    pub fn new(
        response_type: ResponseType,
        scope: Scope,
        client_id: ClientId,
        redirect_uri: Option<Url>,
    ) -> Self {
        Self {
            endpoint: None,
            response_type,
            client_id,
            redirect_uri,
            scope,
            state: None,
            response_mode: None,
            nonce: None,
            display: None,
            prompt: None,
            max_age: None,
            ui_locales: None,
            claims_locales: None,
            id_token_hint: None,
            login_hint: None,
            acr_values: None,
            claims: None,
            request_object: None,
            request_uri: None,
            code_challenge: None,
            code_challenge_method: None,
            resource: None,
            include_granted_scopes: None,
            custom_parameters: UntypedObject::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_response_mode(mut self, response_mode: ResponseMode) -> Self {
        self.response_mode = Some(response_mode);
        self
    }

    pub fn with_nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_max_age(mut self, max_age: MaxAge) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_ui_locales(mut self, ui_locales: UiLocales) -> Self {
        self.ui_locales = Some(ui_locales);
        self
    }

    pub fn with_claims_locales(mut self, claims_locales: ClaimsLocales) -> Self {
        self.claims_locales = Some(claims_locales);
        self
    }

    pub fn with_id_token_hint(mut self, id_token_hint: IdTokenHint) -> Self {
        self.id_token_hint = Some(id_token_hint);
        self
    }

    pub fn with_login_hint(mut self, login_hint: LoginHint) -> Self {
        self.login_hint = Some(login_hint);
        self
    }

    pub fn with_acr_values(mut self, acr_values: AcrValues) -> Self {
        self.acr_values = Some(acr_values);
        self
    }

    pub fn with_claims(mut self, claims: ClaimsRequest) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn with_request_object(mut self, request_object: RequestObject) -> Self {
        self.request_object = Some(request_object);
        self
    }

    pub fn with_request_uri(mut self, request_uri: RequestUri) -> Self {
        self.request_uri = Some(request_uri);
        self
    }

    pub fn with_code_challenge(
        mut self,
        code_challenge: CodeChallenge,
        method: CodeChallengeMethod,
    ) -> Self {
        self.code_challenge = Some(code_challenge);
        self.code_challenge_method = Some(method);
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_include_granted_scopes(mut self, include: bool) -> Self {
        self.include_granted_scopes = Some(IncludeGrantedScopes(include));
        self
    }

    /// Add a parameter without a dedicated setter.
    pub fn with_custom_parameter(mut self, key: impl Into<String>, value: Json) -> Self {
        let _ = self.custom_parameters.insert_raw(key, value);
        self
    }

    pub fn build(self) -> Result<AuthenticationRequest> {
        let by_request_object = self.request_object.is_some() || self.request_uri.is_some();
        if self.request_object.is_some() && self.request_uri.is_some() {
            bail!("'request' and 'request_uri' are mutually exclusive")
        }
        if self.redirect_uri.is_none() && !by_request_object {
            bail!("'redirect_uri' is required unless the request is passed in a request object")
        }
        if !self.scope.contains_openid() {
            bail!("the scope must include the 'openid' value")
        }
        if self.nonce.is_none()
            && (self.response_type.implies_implicit_flow()
                || self.response_type.implies_hybrid_flow())
        {
            bail!("'nonce' is required in the implicit and hybrid flows")
        }

        let mut custom_parameters = self.custom_parameters;
        for key in REGISTERED_PARAMETERS {
            if custom_parameters.0.remove(*key).is_some() {
                warn!("ignoring custom parameter '{key}', use the dedicated setter instead");
            }
        }

        Ok(AuthenticationRequest {
            endpoint: self.endpoint,
            response_type: self.response_type,
            client_id: self.client_id,
            redirect_uri: self.redirect_uri,
            scope: self.scope,
            state: self.state,
            response_mode: self.response_mode,
            nonce: self.nonce,
            display: self.display,
            prompt: self.prompt,
            max_age: self.max_age,
            ui_locales: self.ui_locales,
            claims_locales: self.claims_locales,
            id_token_hint: self.id_token_hint,
            login_hint: self.login_hint,
            acr_values: self.acr_values,
            claims: self.claims.filter(|claims| !claims.is_empty()),
            request_object: self.request_object,
            request_uri: self.request_uri,
            code_challenge: self.code_challenge,
            code_challenge_method: self.code_challenge_method,
            resource: self.resource,
            include_granted_scopes: self.include_granted_scopes,
            custom_parameters,
        })
    }
}

impl From<AuthenticationRequest> for AuthenticationRequestBuilder {
    fn from(request: AuthenticationRequest) -> Self {
        Self {
            endpoint: request.endpoint,
            response_type: request.response_type,
            client_id: request.client_id,
            redirect_uri: request.redirect_uri,
            scope: request.scope,
            state: request.state,
            response_mode: request.response_mode,
            nonce: request.nonce,
            display: request.display,
            prompt: request.prompt,
            max_age: request.max_age,
            ui_locales: request.ui_locales,
            claims_locales: request.claims_locales,
            id_token_hint: request.id_token_hint,
            login_hint: request.login_hint,
            acr_values: request.acr_values,
            claims: request.claims,
            request_object: request.request_object,
            request_uri: request.request_uri,
            code_challenge: request.code_challenge,
            code_challenge_method: request.code_challenge_method,
            resource: request.resource,
            include_granted_scopes: request.include_granted_scopes,
            custom_parameters: request.custom_parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::claims::{ClaimRequirement, ClaimsSetRequest, Entry};
    use serde_json::json;

    fn builder(response_type: &str) -> AuthenticationRequestBuilder {
        AuthenticationRequest::builder(
            response_type.parse().unwrap(),
            Scope::new(["openid", "email"]),
            ClientId("s6BhdRkqt3".into()),
            Some("https://client.example.org/cb".parse().unwrap()),
        )
    }

    #[test]
    fn hybrid_flow_requires_nonce() {
        let err = builder("code id_token").build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'nonce' is required in the implicit and hybrid flows"
        );
        assert!(builder("code id_token")
            .with_nonce(Nonce::random())
            .build()
            .is_ok());
        assert!(builder("code").build().is_ok());
    }

    #[test]
    fn redirect_uri_required_without_request_object() {
        let builder = AuthenticationRequest::builder(
            ResponseType::code(),
            Scope::new(["openid"]),
            ClientId("s6BhdRkqt3".into()),
            None,
        );
        assert!(builder.clone().build().is_err());

        let request = builder
            .with_request_uri(RequestUri(
                "https://client.example.org/request.jwt".parse().unwrap(),
            ))
            .build()
            .unwrap();
        assert_eq!(request.redirect_uri(), None);
    }

    #[test]
    fn built_request_parses_back() {
        let claims = ClaimsRequest::new().with_userinfo_claims(
            ClaimsSetRequest::new()
                .add(Entry::new("email").with_requirement(ClaimRequirement::Essential)),
        );
        let request = builder("code")
            .with_endpoint("https://server.example.com/authorize".parse().unwrap())
            .with_state(State::random())
            .with_display(Display::Touch)
            .with_max_age(MaxAge(600))
            .with_claims(claims)
            .with_custom_parameter("x_foo", json!("bar"))
            .with_custom_parameter("state", json!("ignored"))
            .build()
            .unwrap();
        assert_eq!(request.custom_parameters().len(), 1);

        let url = request.to_url(None).unwrap();
        assert_eq!(AuthenticationRequest::from_url(&url).unwrap(), request);

        let rebuilt = AuthenticationRequestBuilder::from(request.clone())
            .build()
            .unwrap();
        assert_eq!(rebuilt, request);
    }
}
