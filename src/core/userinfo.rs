//! UserInfo responses (OpenID Connect Core 1.0, Section 5.3).

use std::ops::{Deref, DerefMut};

use anyhow::{bail, Error, Result};
use language_tags::LanguageTag;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use super::{
    claims::{set::VERIFIED_CLAIMS, ClaimsSetRequest},
    object::{ParsingErrorContext, TypedParameter, UntypedObject},
};

/// Locally unique identifier of the end-user at the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject(pub String);

impl TypedParameter for Subject {
    const KEY: &'static str = "sub";
}

impl TryFrom<Json> for Subject {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let Json::String(sub) = value else {
            bail!("expected a string")
        };
        if sub.is_empty() {
            bail!("the subject must not be empty")
        }
        Ok(Self(sub))
    }
}

impl From<Subject> for Json {
    fn from(value: Subject) -> Json {
        Json::String(value.0)
    }
}

/// The claims returned by the UserInfo endpoint.
///
/// Claims may be released in several languages, as `name#<lang_tag>` members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UntypedObject", into = "UntypedObject")]
pub struct UserInfo(UntypedObject, Subject);

impl UserInfo {
    pub fn new(sub: Subject, other: Option<UntypedObject>) -> Self {
        Self(other.unwrap_or_default(), sub)
    }

    pub fn sub(&self) -> &Subject {
        &self.1
    }

    pub fn name(&self) -> Option<&str> {
        self.string("name")
    }

    pub fn given_name(&self) -> Option<&str> {
        self.string("given_name")
    }

    pub fn family_name(&self) -> Option<&str> {
        self.string("family_name")
    }

    pub fn preferred_username(&self) -> Option<&str> {
        self.string("preferred_username")
    }

    pub fn email(&self) -> Option<&str> {
        self.string("email")
    }

    pub fn email_verified(&self) -> Option<bool> {
        self.0.get_raw("email_verified")?.as_bool()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.string("phone_number")
    }

    pub fn phone_number_verified(&self) -> Option<bool> {
        self.0.get_raw("phone_number_verified")?.as_bool()
    }

    pub fn locale(&self) -> Option<&str> {
        self.string("locale")
    }

    /// Seconds since the Unix epoch.
    pub fn updated_at(&self) -> Option<i64> {
        self.0.get_raw("updated_at")?.as_i64()
    }

    pub fn address(&self) -> Option<&Json> {
        self.0.get_raw("address")
    }

    /// The `verified_claims` member (OpenID Connect for Identity Assurance), an object or an
    /// array of objects.
    pub fn verified_claims(&self) -> Option<&Json> {
        self.0.get_raw(VERIFIED_CLAIMS)
    }

    /// Look up a claim, in the given language if any.
    pub fn claim(&self, name: &str, lang_tag: Option<&LanguageTag>) -> Option<&Json> {
        match lang_tag {
            Some(tag) => self.0.get_raw(&format!("{name}#{tag}")),
            None => self.0.get_raw(name),
        }
    }

    /// Only `sub` and the claims requested by `request`.
    ///
    /// A claim requested without a language tag keeps all of its language variants; a claim
    /// requested with one keeps that variant only.
    pub fn filter(&self, request: &ClaimsSetRequest) -> Self {
        let mut filtered = UntypedObject::new();
        for (key, value) in self.0.iter() {
            if key != Subject::KEY && !is_requested(key, request) {
                continue;
            }
            filtered.insert_raw(key.clone(), value.clone());
        }
        debug!(
            "released {} of {} UserInfo claim(s)",
            filtered.len(),
            self.0.len()
        );
        Self(filtered, self.1.clone())
    }

    fn string(&self, name: &str) -> Option<&str> {
        self.0.get_raw(name)?.as_str()
    }
}

fn is_requested(key: &str, request: &ClaimsSetRequest) -> bool {
    let name = key.rsplit_once('#').map_or(key, |(name, _)| name);
    request.entries().iter().any(|entry| match entry.lang_tag() {
        Some(_) => entry.wire_key() == key,
        None => entry.claim_name() == name || entry.claim_name() == key,
    })
}

impl From<UserInfo> for UntypedObject {
    fn from(value: UserInfo) -> Self {
        let mut inner = value.0;
        inner.insert(value.1);
        inner
    }
}

impl TryFrom<UntypedObject> for UserInfo {
    type Error = Error;

    fn try_from(value: UntypedObject) -> Result<Self, Self::Error> {
        let sub = value.get().parsing_error()?;
        Ok(Self(value, sub))
    }
}

impl Deref for UserInfo {
    type Target = UntypedObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for UserInfo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
