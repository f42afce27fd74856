//! Logout tokens of OpenID Connect Back-Channel Logout 1.0, Section 2.4.

use std::ops::{Deref, DerefMut};

use anyhow::{bail, Context, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::{
    jwt,
    object::{ParsingErrorContext, TypedParameter, UntypedObject},
    userinfo::Subject,
};

/// The member of `events` that identifies a logout token.
pub const BACKCHANNEL_LOGOUT_EVENT: &str = "http://schemas.openid.net/event/backchannel-logout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutIssuer(pub String);

impl TypedParameter for LogoutIssuer {
    const KEY: &'static str = "iss";
}

impl TryFrom<Json> for LogoutIssuer {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<LogoutIssuer> for Json {
    fn from(value: LogoutIssuer) -> Json {
        Json::String(value.0)
    }
}

/// One or more audiences; a single audience is serialized as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience(pub Vec<String>);

impl Audience {
    pub fn contains(&self, client_id: &str) -> bool {
        self.0.iter().any(|aud| aud == client_id)
    }
}

impl TypedParameter for Audience {
    const KEY: &'static str = "aud";
}

impl TryFrom<Json> for Audience {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let audiences = match value {
            Json::String(aud) => vec![aud],
            Json::Array(_) => serde_json::from_value(value)?,
            _ => bail!("expected a string or an array of strings"),
        };
        if audiences.is_empty() {
            bail!("at least one audience is required")
        }
        Ok(Self(audiences))
    }
}

impl From<Audience> for Json {
    fn from(value: Audience) -> Json {
        match <[String; 1]>::try_from(value.0) {
            Ok([aud]) => Json::String(aud),
            Err(audiences) => audiences.into(),
        }
    }
}

/// Seconds since the Unix epoch at which the token was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedAt(pub i64);

impl TypedParameter for IssuedAt {
    const KEY: &'static str = "iat";
}

impl TryFrom<Json> for IssuedAt {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<IssuedAt> for Json {
    fn from(value: IssuedAt) -> Json {
        value.0.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiration(pub i64);

impl TypedParameter for Expiration {
    const KEY: &'static str = "exp";
}

impl TryFrom<Json> for Expiration {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<Expiration> for Json {
    fn from(value: Expiration) -> Json {
        value.0.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtId(pub String);

impl TypedParameter for JwtId {
    const KEY: &'static str = "jti";
}

impl TryFrom<Json> for JwtId {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<JwtId> for Json {
    fn from(value: JwtId) -> Json {
        Json::String(value.0)
    }
}

/// The `events` claim. Must declare the back-channel logout event with an object value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Events(pub Map<String, Json>);

impl Default for Events {
    fn default() -> Self {
        let mut events = Map::new();
        events.insert(BACKCHANNEL_LOGOUT_EVENT.into(), Json::Object(Map::new()));
        Self(events)
    }
}

impl TypedParameter for Events {
    const KEY: &'static str = "events";
}

impl TryFrom<Json> for Events {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let Json::Object(events) = value else {
            bail!("expected a JSON object")
        };
        match events.get(BACKCHANNEL_LOGOUT_EVENT) {
            Some(Json::Object(_)) => Ok(Self(events)),
            Some(_) => bail!("the '{BACKCHANNEL_LOGOUT_EVENT}' event must be a JSON object"),
            None => bail!("the '{BACKCHANNEL_LOGOUT_EVENT}' event is missing"),
        }
    }
}

impl From<Events> for Json {
    fn from(value: Events) -> Json {
        Json::Object(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl TypedParameter for SessionId {
    const KEY: &'static str = "sid";
}

impl TryFrom<Json> for SessionId {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl From<SessionId> for Json {
    fn from(value: SessionId) -> Json {
        Json::String(value.0)
    }
}

/// The claims of a logout token.
///
/// Identifies the end-user by `sub`, the session by `sid`, or both. A `nonce` is
/// prohibited so that a logout token cannot be mistaken for an ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UntypedObject", into = "UntypedObject")]
pub struct LogoutToken(UntypedObject, LogoutIssuer, Audience, IssuedAt, JwtId, Events);

impl LogoutToken {
    /// # Errors
    /// Fails when neither `sub` nor `sid` is given.
    pub fn new(
        iss: LogoutIssuer,
        aud: Audience,
        iat: IssuedAt,
        jti: JwtId,
        sub: Option<Subject>,
        sid: Option<SessionId>,
    ) -> Result<Self> {
        if sub.is_none() && sid.is_none() {
            bail!("a logout token requires 'sub', 'sid' or both")
        }
        let mut other = UntypedObject::new();
        other.insert_opt(sub);
        other.insert_opt(sid);
        Ok(Self(other, iss, aud, iat, jti, Events::default()))
    }

    /// Read the claims of a compact JWT whose signature the caller has already verified.
    pub fn from_jwt_unverified(jwt: &str) -> Result<Self> {
        let claims = jwt::decode_claims_unverified(jwt)?;
        Self::try_from(UntypedObject::from(claims)).context("invalid logout token")
    }

    pub fn iss(&self) -> &LogoutIssuer {
        &self.1
    }

    pub fn aud(&self) -> &Audience {
        &self.2
    }

    pub fn iat(&self) -> IssuedAt {
        self.3
    }

    pub fn jti(&self) -> &JwtId {
        &self.4
    }

    pub fn events(&self) -> &Events {
        &self.5
    }

    pub fn sub(&self) -> Option<Result<Subject>> {
        self.0.get()
    }

    pub fn sid(&self) -> Option<Result<SessionId>> {
        self.0.get()
    }

    pub fn exp(&self) -> Option<Result<Expiration>> {
        self.0.get()
    }

    pub fn with_exp(mut self, exp: Expiration) -> Self {
        let _ = self.0.insert(exp);
        self
    }
}

impl From<LogoutToken> for UntypedObject {
    fn from(value: LogoutToken) -> Self {
        let mut inner = value.0;
        inner.insert(value.1);
        inner.insert(value.2);
        inner.insert(value.3);
        inner.insert(value.4);
        inner.insert(value.5);
        inner
    }
}

impl TryFrom<UntypedObject> for LogoutToken {
    type Error = Error;

    fn try_from(value: UntypedObject) -> Result<Self, Self::Error> {
        let iss = value.get().parsing_error()?;
        let aud = value.get().parsing_error()?;
        let iat = value.get().parsing_error()?;
        let jti = value.get().parsing_error()?;
        let events = value.get().parsing_error()?;

        let sub = value.get::<Subject>().map(|r| r.parsing_error()).transpose()?;
        let sid = value.get::<SessionId>().map(|r| r.parsing_error()).transpose()?;
        if sub.is_none() && sid.is_none() {
            bail!("a logout token requires 'sub', 'sid' or both")
        }
        if value.contains("nonce") {
            bail!("a logout token must not contain 'nonce'")
        }
        if let Some(exp) = value.get::<Expiration>() {
            exp.parsing_error()?;
        }

        Ok(Self(value, iss, aud, iat, jti, events))
    }
}

impl Deref for LogoutToken {
    type Target = UntypedObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for LogoutToken {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims() -> Json {
        json!({
            "iss": "https://server.example.com",
            "sub": "248289761001",
            "aud": "s6BhdRkqt3",
            "iat": 1471566154,
            "jti": "bWJq",
            "sid": "08a5019c-17e1-4977-8f42-65a12843ea02",
            "events": {
                "http://schemas.openid.net/event/backchannel-logout": {}
            }
        })
    }

    fn parse(value: Json) -> Result<LogoutToken, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn parse_logout_token() {
        let token = parse(claims()).unwrap();
        assert_eq!(token.iss().0, "https://server.example.com");
        assert!(token.aud().contains("s6BhdRkqt3"));
        assert_eq!(token.iat(), IssuedAt(1471566154));
        assert_eq!(token.sub().unwrap().unwrap().0, "248289761001");
        assert!(token.exp().is_none());

        let json = serde_json::to_value(token).unwrap();
        assert_eq!(json, claims());
    }

    #[test]
    fn audience_array() {
        let mut claims = claims();
        claims["aud"] = json!(["s6BhdRkqt3", "other"]);
        let token = parse(claims.clone()).unwrap();
        assert_eq!(token.aud().0.len(), 2);
        assert_eq!(serde_json::to_value(token).unwrap()["aud"], claims["aud"]);
    }

    #[test]
    fn rejects_invalid_tokens() {
        let mut nonce = claims();
        nonce["nonce"] = json!("n-0S6_WzA2Mj");
        assert!(parse(nonce).is_err());

        let mut anonymous = claims();
        anonymous.as_object_mut().unwrap().remove("sub");
        anonymous.as_object_mut().unwrap().remove("sid");
        assert!(parse(anonymous).is_err());

        let mut events = claims();
        events["events"] = json!({"http://schemas.openid.net/event/backchannel-logout": "yes"});
        assert!(parse(events).is_err());

        let mut no_event = claims();
        no_event["events"] = json!({});
        let err = parse(no_event).unwrap_err();
        assert!(err.to_string().contains("'events' could not be parsed"));

        let mut no_jti = claims();
        no_jti.as_object_mut().unwrap().remove("jti");
        assert!(parse(no_jti).is_err());
    }

    #[test]
    fn from_jwt() {
        let Json::Object(claims) = claims() else {
            unreachable!()
        };
        let token = LogoutToken::from_jwt_unverified(&jwt::encode_unsecured(&claims)).unwrap();
        assert_eq!(token.jti().0, "bWJq");
    }

    #[test]
    fn new_requires_sub_or_sid() {
        let new = |sub, sid| {
            LogoutToken::new(
                LogoutIssuer("https://server.example.com".into()),
                Audience(vec!["s6BhdRkqt3".into()]),
                IssuedAt(1471566154),
                JwtId("bWJq".into()),
                sub,
                sid,
            )
        };
        assert!(new(None, None).is_err());
        let token = new(None, Some(SessionId("08a5019c".into())))
            .unwrap()
            .with_exp(Expiration(1471566274));
        assert_eq!(token.exp().unwrap().unwrap(), Expiration(1471566274));

        let json = serde_json::to_value(token).unwrap();
        let reparsed: LogoutToken = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(reparsed.sid().unwrap().unwrap().0, "08a5019c");
        assert_eq!(serde_json::to_value(reparsed).unwrap(), json);
    }
}
