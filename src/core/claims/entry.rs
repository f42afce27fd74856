use std::fmt;

use language_tags::LanguageTag;
use serde_json::{Map, Value as Json};
use tracing::debug;

use super::ClaimRequirement;
use crate::core::error::ClaimsError;

const ESSENTIAL: &str = "essential";
const VALUE: &str = "value";
const VALUES: &str = "values";
const PURPOSE: &str = "purpose";
const RESERVED: [&str; 4] = [ESSENTIAL, VALUE, VALUES, PURPOSE];

/// Bounds on the length of a `purpose` (OpenID Connect for Identity Assurance, Section 6.1).
pub const PURPOSE_MIN_LENGTH: usize = 3;
pub const PURPOSE_MAX_LENGTH: usize = 300;

/// A single requested claim.
///
/// Identified within its claim set by the claim name and the optional language tag. At most
/// one of `value` and `values` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    claim_name: String,
    lang_tag: Option<LanguageTag>,
    requirement: ClaimRequirement,
    value: Option<Json>,
    values: Option<Vec<Json>>,
    purpose: Option<String>,
    additional_information: Option<Map<String, Json>>,
}

impl Entry {
    /// A voluntary request for the claim, without constraints.
    ///
    /// # Panics
    /// Panics if `claim_name` is empty.
    pub fn new(claim_name: impl Into<String>) -> Self {
        let claim_name = claim_name.into();
        assert!(!claim_name.is_empty(), "the claim name must not be empty");
        Self {
            claim_name,
            lang_tag: None,
            requirement: ClaimRequirement::Voluntary,
            value: None,
            values: None,
            purpose: None,
            additional_information: None,
        }
    }

    pub fn claim_name(&self) -> &str {
        &self.claim_name
    }

    pub fn lang_tag(&self) -> Option<&LanguageTag> {
        self.lang_tag.as_ref()
    }

    pub fn requirement(&self) -> ClaimRequirement {
        self.requirement
    }

    pub fn is_essential(&self) -> bool {
        self.requirement == ClaimRequirement::Essential
    }

    pub fn value(&self) -> Option<&Json> {
        self.value.as_ref()
    }

    /// The `value` as a string, if it is one.
    pub fn value_as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Json::as_str)
    }

    pub fn values(&self) -> Option<&[Json]> {
        self.values.as_deref()
    }

    /// The string members of `values`, skipping any other kind of value.
    pub fn values_as_strs(&self) -> Option<Vec<&str>> {
        self.values
            .as_ref()
            .map(|values| values.iter().filter_map(Json::as_str).collect())
    }

    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    pub fn additional_information(&self) -> Option<&Map<String, Json>> {
        self.additional_information.as_ref()
    }

    pub fn with_lang_tag(mut self, lang_tag: Option<LanguageTag>) -> Self {
        self.lang_tag = lang_tag;
        self
    }

    pub fn with_requirement(mut self, requirement: ClaimRequirement) -> Self {
        self.requirement = requirement;
        self
    }

    /// Set the single expected value, clearing `values`. A `null` value clears both.
    pub fn with_value(mut self, value: impl Into<Json>) -> Self {
        self.value = Some(value.into()).filter(|value| !value.is_null());
        self.values = None;
        self
    }

    /// Set the acceptable values, clearing `value`.
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Json>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self.value = None;
        self
    }

    /// Set the purpose, which must be between 3 and 300 characters long.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Result<Self, ClaimsError> {
        let purpose = purpose.into();
        let found = purpose.chars().count();
        if !(PURPOSE_MIN_LENGTH..=PURPOSE_MAX_LENGTH).contains(&found) {
            return Err(ClaimsError::InvalidPurposeLength {
                min: PURPOSE_MIN_LENGTH,
                max: PURPOSE_MAX_LENGTH,
                found,
            });
        }
        self.purpose = Some(purpose);
        Ok(self)
    }

    /// Set the members carried next to the reserved ones. An empty map clears them.
    ///
    /// Fails if `info` holds `essential`, `value`, `values` or `purpose`.
    pub fn with_additional_information(
        mut self,
        info: Map<String, Json>,
    ) -> Result<Self, ClaimsError> {
        if let Some(reserved) = info.keys().find(|key| RESERVED.contains(&key.as_str())) {
            return Err(ClaimsError::ReservedMember(reserved.clone()));
        }
        self.additional_information = (!info.is_empty()).then_some(info);
        Ok(self)
    }

    /// Whether this entry has the given claim name and language tag.
    pub fn matches(&self, claim_name: &str, lang_tag: Option<&LanguageTag>) -> bool {
        self.claim_name == claim_name && self.lang_tag.as_ref() == lang_tag
    }

    /// Combine with a request for the same claim: the stronger requirement wins and every
    /// constraint set on `other` overrides the one set here.
    pub fn merge(mut self, other: &Entry) -> Self {
        self.requirement = self.requirement.max(other.requirement);
        if other.value.is_some() || other.values.is_some() {
            self.value = other.value.clone();
            self.values = other.values.clone();
        }
        if let Some(purpose) = &other.purpose {
            self.purpose = Some(purpose.clone());
        }
        if let Some(info) = &other.additional_information {
            self.additional_information
                .get_or_insert_with(Map::new)
                .extend(info.clone());
        }
        self
    }

    /// The member name of this entry: the claim name, suffixed with `#<lang_tag>` if any.
    pub fn wire_key(&self) -> String {
        match &self.lang_tag {
            Some(tag) => format!("{}#{}", self.claim_name, tag),
            None => self.claim_name.clone(),
        }
    }

    /// The member value of this entry: `null` for a voluntary request without constraints,
    /// otherwise an object.
    pub fn wire_spec(&self) -> Json {
        if !self.is_essential()
            && self.value.is_none()
            && self.values.is_none()
            && self.purpose.is_none()
            && self.additional_information.is_none()
        {
            return Json::Null;
        }

        let mut spec = Map::new();
        if self.is_essential() {
            spec.insert(ESSENTIAL.into(), Json::Bool(true));
        }
        if let Some(value) = &self.value {
            spec.insert(VALUE.into(), value.clone());
        }
        if let Some(values) = &self.values {
            spec.insert(VALUES.into(), Json::Array(values.clone()));
        }
        if let Some(purpose) = &self.purpose {
            spec.insert(PURPOSE.into(), Json::String(purpose.clone()));
        }
        if let Some(info) = &self.additional_information {
            spec.extend(info.clone());
        }
        Json::Object(spec)
    }

    pub fn to_wire_entry(&self) -> (String, Json) {
        (self.wire_key(), self.wire_spec())
    }

    /// Parse a claims request member.
    ///
    /// The language tag is split off at the last `#`; a suffix that is not a valid language
    /// tag is kept as part of the claim name. A `null` spec is a voluntary request. The
    /// purpose length is not checked here.
    pub fn parse(key: &str, spec: &Json) -> Result<Self, ClaimsError> {
        if key.is_empty() {
            return Err(ClaimsError::EmptyClaimName);
        }
        let entry = Self::split_key(key);

        let spec = match spec {
            Json::Null => return Ok(entry),
            Json::Object(spec) => spec,
            _ => return Err(ClaimsError::NotAnObject(format!("\"{key}\""))),
        };

        let invalid = |member: &'static str, reason: &str| ClaimsError::InvalidMember {
            claim: key.to_owned(),
            member,
            reason: reason.to_owned(),
        };

        let mut entry = entry;
        let mut additional = Map::new();
        for (member, value) in spec {
            match (member.as_str(), value) {
                (ESSENTIAL, Json::Bool(essential)) => {
                    entry.requirement = if *essential {
                        ClaimRequirement::Essential
                    } else {
                        ClaimRequirement::Voluntary
                    };
                }
                (ESSENTIAL, _) => return Err(invalid(ESSENTIAL, "must be a boolean")),
                (VALUE, Json::Null) => {}
                (VALUE, value) => entry.value = Some(value.clone()),
                (VALUES, Json::Array(values)) => entry.values = Some(values.clone()),
                (VALUES, _) => return Err(invalid(VALUES, "must be a JSON array")),
                (PURPOSE, Json::String(purpose)) => entry.purpose = Some(purpose.clone()),
                (PURPOSE, _) => return Err(invalid(PURPOSE, "must be a string")),
                (other, value) => {
                    additional.insert(other.to_owned(), value.clone());
                }
            }
        }
        if entry.value.is_some() && entry.values.is_some() {
            return Err(invalid(VALUES, "must not be combined with \"value\""));
        }
        entry.additional_information = (!additional.is_empty()).then_some(additional);
        Ok(entry)
    }

    fn split_key(key: &str) -> Self {
        if let Some((name, tag)) = key.rsplit_once('#') {
            if !name.is_empty() {
                match LanguageTag::parse(tag) {
                    Ok(tag) => return Self::new(name).with_lang_tag(Some(tag)),
                    Err(e) => {
                        debug!("claim '{key}' has an invalid language tag suffix ({e}), keeping it as a claim name")
                    }
                }
            }
        }
        Self::new(key)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.wire_key().fmt(f)
    }
}
