use std::fmt;

use crate::{
    core::{jwt, object::TypedParameter},
    utils::{join_space_delimited, space_delimited, NonEmptyVec},
};
use anyhow::{bail, Context, Error, Result};
use language_tags::LanguageTag;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use url::Url;

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl TypedParameter for ClientId {
    const KEY: &'static str = "client_id";
}

impl TryFrom<Json> for ClientId {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<ClientId> for Json {
    fn from(value: ClientId) -> Self {
        Json::String(value.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// `redirect_uri` field in the Authorization Request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUri(pub Url);

impl TypedParameter for RedirectUri {
    const KEY: &'static str = "redirect_uri";
}

impl From<RedirectUri> for Json {
    fn from(value: RedirectUri) -> Self {
        value.0.to_string().into()
    }
}

impl TryFrom<Json> for RedirectUri {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(value).map(RedirectUri)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State(pub String);

impl State {
    /// A fresh state value of 32 alphanumeric characters.
    pub fn random() -> Self {
        Self(random_string(32))
    }
}

impl TypedParameter for State {
    const KEY: &'static str = "state";
}

impl TryFrom<Json> for State {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<State> for Json {
    fn from(value: State) -> Self {
        Json::String(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(pub String);

impl Nonce {
    /// A fresh nonce of 16 alphanumeric characters.
    pub fn random() -> Self {
        Self(random_string(16))
    }
}

impl TypedParameter for Nonce {
    const KEY: &'static str = "nonce";
}

impl TryFrom<Json> for Nonce {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<Nonce> for Json {
    fn from(value: Nonce) -> Self {
        Json::String(value.0)
    }
}

/// The `scope` parameter: an ordered set of scope tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope(Vec<String>);

impl Scope {
    pub const OPENID: &'static str = "openid";

    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .fold(Self::default(), |scope, value| scope.with(value))
    }

    /// Add a scope value, ignoring duplicates.
    pub fn with(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !self.0.contains(&value) {
            self.0.push(value);
        }
        self
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn contains_openid(&self) -> bool {
        self.contains(Self::OPENID)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TypedParameter for Scope {
    const KEY: &'static str = "scope";
}

impl TryFrom<Json> for Scope {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self::new(space_delimited(value)?))
    }
}

impl From<Scope> for Json {
    fn from(value: Scope) -> Self {
        join_space_delimited(value.0)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.join(" ").fmt(f)
    }
}

const CODE: &str = "code";
const TOKEN: &str = "token";
const ID_TOKEN: &str = "id_token";
const NONE: &str = "none";

/// A single value of the `response_type` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseTypeValue {
    Code,
    Token,
    IdToken,
    None,
    Other(String),
}

impl From<String> for ResponseTypeValue {
    fn from(s: String) -> Self {
        match s.as_str() {
            CODE => ResponseTypeValue::Code,
            TOKEN => ResponseTypeValue::Token,
            ID_TOKEN => ResponseTypeValue::IdToken,
            NONE => ResponseTypeValue::None,
            _ => ResponseTypeValue::Other(s),
        }
    }
}

impl fmt::Display for ResponseTypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseTypeValue::Code => CODE,
            ResponseTypeValue::Token => TOKEN,
            ResponseTypeValue::IdToken => ID_TOKEN,
            ResponseTypeValue::None => NONE,
            ResponseTypeValue::Other(o) => o,
        }
        .fmt(f)
    }
}

/// The `response_type` parameter: a set of [ResponseTypeValue]s.
///
/// Equality ignores the order in which the values were given.
#[derive(Debug, Clone, Eq)]
pub struct ResponseType(Vec<ResponseTypeValue>);

impl ResponseType {
    pub fn new<I: IntoIterator<Item = ResponseTypeValue>>(values: I) -> Result<Self> {
        let mut deduplicated: Vec<ResponseTypeValue> = Vec::new();
        for value in values {
            if !deduplicated.contains(&value) {
                deduplicated.push(value);
            }
        }
        if deduplicated.is_empty() {
            bail!("the response type must contain at least one value")
        }
        if deduplicated.len() > 1 && deduplicated.contains(&ResponseTypeValue::None) {
            bail!("the response type value 'none' must not be combined with other values")
        }
        Ok(Self(deduplicated))
    }

    pub fn code() -> Self {
        Self(vec![ResponseTypeValue::Code])
    }

    pub fn id_token() -> Self {
        Self(vec![ResponseTypeValue::IdToken])
    }

    pub fn contains(&self, value: &ResponseTypeValue) -> bool {
        self.0.contains(value)
    }

    pub fn values(&self) -> &[ResponseTypeValue] {
        &self.0
    }

    /// `code` alone.
    pub fn implies_code_flow(&self) -> bool {
        self.0 == [ResponseTypeValue::Code]
    }

    /// `id_token` and/or `token` without `code`.
    pub fn implies_implicit_flow(&self) -> bool {
        !self.contains(&ResponseTypeValue::Code) && self.issues_front_channel_token()
    }

    /// `code` together with `id_token` and/or `token`.
    pub fn implies_hybrid_flow(&self) -> bool {
        self.contains(&ResponseTypeValue::Code) && self.issues_front_channel_token()
    }

    /// Whether the response type requests any OpenID Connect artifact, i.e. an ID token
    /// directly or an authorization code that can be exchanged for one.
    pub fn is_openid(&self) -> bool {
        self.contains(&ResponseTypeValue::Code) || self.contains(&ResponseTypeValue::IdToken)
    }

    /// The response mode to use when `response_mode` is not given: `query` for the code
    /// flow and `none`, `fragment` as soon as a token is returned from the authorization
    /// endpoint.
    pub fn implied_response_mode(&self) -> ResponseMode {
        if self.issues_front_channel_token() {
            ResponseMode::Fragment
        } else {
            ResponseMode::Query
        }
    }

    fn issues_front_channel_token(&self) -> bool {
        self.contains(&ResponseTypeValue::Token) || self.contains(&ResponseTypeValue::IdToken)
    }
}

impl PartialEq for ResponseType {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|v| other.contains(v))
    }
}

impl TypedParameter for ResponseType {
    const KEY: &'static str = "response_type";
}

impl TryFrom<Json> for ResponseType {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Self::new(
            space_delimited(value)?
                .into_iter()
                .map(ResponseTypeValue::from),
        )
    }
}

impl From<ResponseType> for Json {
    fn from(value: ResponseType) -> Self {
        join_space_delimited(value.0.iter().map(ToString::to_string))
    }
}

impl std::str::FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Json::String(s.to_owned()).try_into()
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        values.join(" ").fmt(f)
    }
}

const QUERY: &str = "query";
const FRAGMENT: &str = "fragment";
const FORM_POST: &str = "form_post";
const QUERY_JWT: &str = "query.jwt";
const FRAGMENT_JWT: &str = "fragment.jwt";
const FORM_POST_JWT: &str = "form_post.jwt";
const JWT: &str = "jwt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ResponseMode {
    Query,
    Fragment,
    FormPost,
    /// JWT Secured Authorization Response Mode (JARM) variants.
    QueryJwt,
    FragmentJwt,
    FormPostJwt,
    Jwt,
    Other(String),
}

impl ResponseMode {
    pub fn is_jarm(&self) -> bool {
        matches!(
            self,
            ResponseMode::QueryJwt
                | ResponseMode::FragmentJwt
                | ResponseMode::FormPostJwt
                | ResponseMode::Jwt
        )
    }
}

impl TypedParameter for ResponseMode {
    const KEY: &'static str = "response_mode";
}

impl From<String> for ResponseMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            QUERY => ResponseMode::Query,
            FRAGMENT => ResponseMode::Fragment,
            FORM_POST => ResponseMode::FormPost,
            QUERY_JWT => ResponseMode::QueryJwt,
            FRAGMENT_JWT => ResponseMode::FragmentJwt,
            FORM_POST_JWT => ResponseMode::FormPostJwt,
            JWT => ResponseMode::Jwt,
            _ => ResponseMode::Other(s),
        }
    }
}

impl From<ResponseMode> for String {
    fn from(rm: ResponseMode) -> Self {
        match rm {
            ResponseMode::Other(o) => o,
            known => known.to_string(),
        }
    }
}

impl TryFrom<Json> for ResponseMode {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let s: String = serde_json::from_value(value)?;
        Ok(s.into())
    }
}

impl From<ResponseMode> for Json {
    fn from(rm: ResponseMode) -> Self {
        String::from(rm).into()
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseMode::Query => QUERY,
            ResponseMode::Fragment => FRAGMENT,
            ResponseMode::FormPost => FORM_POST,
            ResponseMode::QueryJwt => QUERY_JWT,
            ResponseMode::FragmentJwt => FRAGMENT_JWT,
            ResponseMode::FormPostJwt => FORM_POST_JWT,
            ResponseMode::Jwt => JWT,
            ResponseMode::Other(o) => o,
        }
        .fmt(f)
    }
}

const PAGE: &str = "page";
const POPUP: &str = "popup";
const TOUCH: &str = "touch";
const WAP: &str = "wap";

/// How the authorization server displays the authentication and consent pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Display {
    #[default]
    Page,
    Popup,
    Touch,
    Wap,
}

impl TypedParameter for Display {
    const KEY: &'static str = "display";
}

impl TryFrom<Json> for Display {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let s: String = serde_json::from_value(value)?;
        match s.as_str() {
            PAGE => Ok(Display::Page),
            POPUP => Ok(Display::Popup),
            TOUCH => Ok(Display::Touch),
            WAP => Ok(Display::Wap),
            _ => bail!("Unknown display type: {s}"),
        }
    }
}

impl From<Display> for Json {
    fn from(value: Display) -> Self {
        value.to_string().into()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Display::Page => PAGE,
            Display::Popup => POPUP,
            Display::Touch => TOUCH,
            Display::Wap => WAP,
        }
        .fmt(f)
    }
}

const LOGIN: &str = "login";
const CONSENT: &str = "consent";
const SELECT_ACCOUNT: &str = "select_account";
const CREATE: &str = "create";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PromptValue {
    None,
    Login,
    Consent,
    SelectAccount,
    Create,
    Other(String),
}

impl From<String> for PromptValue {
    fn from(s: String) -> Self {
        match s.as_str() {
            NONE => PromptValue::None,
            LOGIN => PromptValue::Login,
            CONSENT => PromptValue::Consent,
            SELECT_ACCOUNT => PromptValue::SelectAccount,
            CREATE => PromptValue::Create,
            _ => PromptValue::Other(s),
        }
    }
}

impl fmt::Display for PromptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptValue::None => NONE,
            PromptValue::Login => LOGIN,
            PromptValue::Consent => CONSENT,
            PromptValue::SelectAccount => SELECT_ACCOUNT,
            PromptValue::Create => CREATE,
            PromptValue::Other(o) => o,
        }
        .fmt(f)
    }
}

/// The `prompt` parameter. `none` must not be combined with any other value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(NonEmptyVec<PromptValue>);

impl Prompt {
    pub fn new(values: Vec<PromptValue>) -> Result<Self> {
        let values = NonEmptyVec::try_from(values).context("the prompt must not be empty")?;
        if values.len() > 1 && values.contains(&PromptValue::None) {
            bail!("Invalid prompt: The none value must not be combined with other values")
        }
        Ok(Self(values))
    }

    pub fn contains(&self, value: &PromptValue) -> bool {
        self.0.contains(value)
    }

    pub fn values(&self) -> &[PromptValue] {
        &self.0
    }
}

impl TypedParameter for Prompt {
    const KEY: &'static str = "prompt";
}

impl TryFrom<Json> for Prompt {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Self::new(
            space_delimited(value)?
                .into_iter()
                .map(PromptValue::from)
                .collect(),
        )
    }
}

impl From<Prompt> for Json {
    fn from(value: Prompt) -> Self {
        join_space_delimited(value.0.iter().map(ToString::to_string))
    }
}

/// Maximum authentication age in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAge(pub u64);

impl TypedParameter for MaxAge {
    const KEY: &'static str = "max_age";
}

impl TryFrom<Json> for MaxAge {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::String(s) => s
                .parse()
                .map(Self)
                .with_context(|| format!("'{s}' is not a non-negative integer")),
            Json::Number(n) => n
                .as_u64()
                .map(Self)
                .with_context(|| format!("'{n}' is not a non-negative integer")),
            other => bail!("expected an integer, found {other}"),
        }
    }
}

impl From<MaxAge> for Json {
    fn from(value: MaxAge) -> Self {
        value.0.to_string().into()
    }
}

fn language_tags(value: Json) -> Result<Vec<LanguageTag>> {
    space_delimited(value)?
        .iter()
        .map(|tag| LanguageTag::parse(tag).with_context(|| format!("invalid language tag '{tag}'")))
        .collect()
}

/// End-user's preferred languages for the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiLocales(pub Vec<LanguageTag>);

impl TypedParameter for UiLocales {
    const KEY: &'static str = "ui_locales";
}

impl TryFrom<Json> for UiLocales {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        language_tags(value).map(Self)
    }
}

impl From<UiLocales> for Json {
    fn from(value: UiLocales) -> Self {
        join_space_delimited(value.0.iter().map(LanguageTag::as_str))
    }
}

/// End-user's preferred languages for the returned claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsLocales(pub Vec<LanguageTag>);

impl TypedParameter for ClaimsLocales {
    const KEY: &'static str = "claims_locales";
}

impl TryFrom<Json> for ClaimsLocales {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        language_tags(value).map(Self)
    }
}

impl From<ClaimsLocales> for Json {
    fn from(value: ClaimsLocales) -> Self {
        join_space_delimited(value.0.iter().map(LanguageTag::as_str))
    }
}

/// A previously issued ID token, passed as a hint about the end-user.
///
/// Only its header is inspected: the token may be signed, encrypted or unsecured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTokenHint(pub String);

impl TypedParameter for IdTokenHint {
    const KEY: &'static str = "id_token_hint";
}

impl TryFrom<Json> for IdTokenHint {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let jwt: String = serde_json::from_value(value)?;
        jwt::decode_header(&jwt)?;
        Ok(Self(jwt))
    }
}

impl From<IdTokenHint> for Json {
    fn from(value: IdTokenHint) -> Self {
        Json::String(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginHint(pub String);

impl TypedParameter for LoginHint {
    const KEY: &'static str = "login_hint";
}

impl TryFrom<Json> for LoginHint {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<LoginHint> for Json {
    fn from(value: LoginHint) -> Self {
        Json::String(value.0)
    }
}

/// An Authentication Context Class Reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acr(pub String);

impl Acr {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Acr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Requested ACR values, in order of preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcrValues(pub NonEmptyVec<Acr>);

impl TypedParameter for AcrValues {
    const KEY: &'static str = "acr_values";
}

impl TryFrom<Json> for AcrValues {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let values: Vec<Acr> = space_delimited(value)?.into_iter().map(Acr).collect();
        NonEmptyVec::try_from(values)
            .map(Self)
            .context("the ACR values must not be empty")
    }
}

impl From<AcrValues> for Json {
    fn from(value: AcrValues) -> Self {
        join_space_delimited(value.0.iter().map(|acr| acr.0.as_str()))
    }
}

/// A request object passed by value in the `request` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestObject(pub String);

impl TypedParameter for RequestObject {
    const KEY: &'static str = "request";
}

impl TryFrom<Json> for RequestObject {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<RequestObject> for Json {
    fn from(value: RequestObject) -> Self {
        Json::String(value.0)
    }
}

/// A request object passed by reference in the `request_uri` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUri(pub Url);

impl TypedParameter for RequestUri {
    const KEY: &'static str = "request_uri";
}

impl TryFrom<Json> for RequestUri {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(value).map(Self)?)
    }
}

impl From<RequestUri> for Json {
    fn from(value: RequestUri) -> Self {
        value.0.to_string().into()
    }
}

/// PKCE code challenge (RFC 7636).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge(pub String);

impl TypedParameter for CodeChallenge {
    const KEY: &'static str = "code_challenge";
}

impl TryFrom<Json> for CodeChallenge {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<CodeChallenge> for Json {
    fn from(value: CodeChallenge) -> Self {
        Json::String(value.0)
    }
}

const PLAIN: &str = "plain";
const S256: &str = "S256";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CodeChallengeMethod {
    /// The default when `code_challenge_method` is omitted.
    #[default]
    Plain,
    S256,
    Other(String),
}

impl TypedParameter for CodeChallengeMethod {
    const KEY: &'static str = "code_challenge_method";
}

impl From<String> for CodeChallengeMethod {
    fn from(s: String) -> Self {
        match s.as_str() {
            PLAIN => CodeChallengeMethod::Plain,
            S256 => CodeChallengeMethod::S256,
            _ => CodeChallengeMethod::Other(s),
        }
    }
}

impl TryFrom<Json> for CodeChallengeMethod {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let s: String = serde_json::from_value(value)?;
        Ok(s.into())
    }
}

impl From<CodeChallengeMethod> for Json {
    fn from(value: CodeChallengeMethod) -> Self {
        match value {
            CodeChallengeMethod::Plain => PLAIN.into(),
            CodeChallengeMethod::S256 => S256.into(),
            CodeChallengeMethod::Other(o) => o.into(),
        }
    }
}

/// Resource indicator (RFC 8707): an absolute URI without a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource(pub Url);

impl TypedParameter for Resource {
    const KEY: &'static str = "resource";
}

impl TryFrom<Json> for Resource {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let url: Url = serde_json::from_value(value)?;
        if url.fragment().is_some() {
            bail!("the resource URI must not contain a fragment")
        }
        Ok(Self(url))
    }
}

impl From<Resource> for Json {
    fn from(value: Resource) -> Self {
        value.0.to_string().into()
    }
}

/// Incremental authorization: whether previously granted scopes are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeGrantedScopes(pub bool);

impl TypedParameter for IncludeGrantedScopes {
    const KEY: &'static str = "include_granted_scopes";
}

impl TryFrom<Json> for IncludeGrantedScopes {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Bool(b) => Ok(Self(b)),
            Json::String(s) if s == "true" => Ok(Self(true)),
            Json::String(s) if s == "false" => Ok(Self(false)),
            other => bail!("expected 'true' or 'false', found {other}"),
        }
    }
}

impl From<IncludeGrantedScopes> for Json {
    fn from(value: IncludeGrantedScopes) -> Self {
        value.0.to_string().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_type_flows() {
        let rt = |s: &str| s.parse::<ResponseType>().unwrap();

        assert!(rt("code").implies_code_flow());
        assert!(rt("id_token").implies_implicit_flow());
        assert!(rt("id_token token").implies_implicit_flow());
        assert!(rt("token").implies_implicit_flow());
        assert!(rt("code id_token").implies_hybrid_flow());
        assert!(rt("code token").implies_hybrid_flow());
        assert!(rt("code id_token token").implies_hybrid_flow());
        assert!(!rt("code").implies_hybrid_flow());
        assert!(!rt("token").is_openid());

        assert_eq!(rt("code").implied_response_mode(), ResponseMode::Query);
        assert_eq!(rt("none").implied_response_mode(), ResponseMode::Query);
        assert_eq!(rt("id_token token").implied_response_mode(), ResponseMode::Fragment);
        assert_eq!(rt("code id_token").implied_response_mode(), ResponseMode::Fragment);
    }

    #[test]
    fn response_type_equality_ignores_order() {
        let a: ResponseType = "token id_token".parse().unwrap();
        let b: ResponseType = "id_token token".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(Json::from(a), json!("token id_token"));
    }

    #[test]
    fn response_type_rejects_empty_and_combined_none() {
        assert!("".parse::<ResponseType>().is_err());
        assert!("none code".parse::<ResponseType>().is_err());
    }

    #[test]
    fn scope_deduplicates_and_preserves_order() {
        let scope = Scope::try_from(json!("openid email openid profile")).unwrap();
        assert_eq!(scope.to_string(), "openid email profile");
        assert!(scope.contains_openid());
        assert!(!Scope::new(["email"]).contains_openid());
    }

    #[test]
    fn display_rejects_unknown_values() {
        assert_eq!(Display::try_from(json!("popup")).unwrap(), Display::Popup);
        let err = Display::try_from(json!("fullscreen")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown display type: fullscreen");
    }

    #[test]
    fn prompt_none_stands_alone() {
        let prompt = Prompt::try_from(json!("login consent")).unwrap();
        assert!(prompt.contains(&PromptValue::Consent));
        assert!(Prompt::try_from(json!("none login")).is_err());
        assert!(Prompt::try_from(json!("")).is_err());
    }

    #[test]
    fn max_age_from_query_and_request_object() {
        assert_eq!(MaxAge::try_from(json!("3600")).unwrap(), MaxAge(3600));
        assert_eq!(MaxAge::try_from(json!(60)).unwrap(), MaxAge(60));
        assert!(MaxAge::try_from(json!("-1")).is_err());
        assert!(MaxAge::try_from(json!(-1)).is_err());
        assert!(MaxAge::try_from(json!("soon")).is_err());
    }

    #[test]
    fn locales_are_language_tags() {
        let locales = UiLocales::try_from(json!("fr-CA fr en")).unwrap();
        assert_eq!(locales.0.len(), 3);
        assert_eq!(Json::from(locales), json!("fr-CA fr en"));
        assert!(ClaimsLocales::try_from(json!("not_a_tag!")).is_err());
    }

    #[test]
    fn id_token_hint_requires_a_jwt() {
        assert!(IdTokenHint::try_from(json!("eyJhbGciOiJub25lIn0.e30.")).is_ok());
        let err = IdTokenHint::try_from(json!("garbage")).unwrap_err();
        assert!(err.to_string().starts_with("invalid serialized JWT"));
    }

    #[test]
    fn random_values_have_expected_length() {
        assert_eq!(Nonce::random().0.len(), 16);
        assert_eq!(State::random().0.len(), 32);
        assert_ne!(State::random(), State::random());
    }

    #[test]
    fn resource_must_not_have_fragment() {
        assert!(Resource::try_from(json!("https://rs.example.com/api")).is_ok());
        assert!(Resource::try_from(json!("https://rs.example.com/api#frag")).is_err());
    }

    #[test]
    fn include_granted_scopes_values() {
        assert!(IncludeGrantedScopes::try_from(json!("true")).unwrap().0);
        assert!(!IncludeGrantedScopes::try_from(json!(false)).unwrap().0);
        assert!(IncludeGrantedScopes::try_from(json!("yes")).is_err());
    }
}
