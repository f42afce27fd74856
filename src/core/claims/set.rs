use std::collections::BTreeSet;

use language_tags::LanguageTag;
use serde_json::{Map, Value as Json};

use super::{standard_scope_claims, ClaimsSet, CustomClaimsByScope, Entry};
use crate::core::{authorization_request::parameters::Scope, error::ClaimsError};

/// Member name reserved for Identity Assurance, handled by the enclosing claims request.
pub(crate) const VERIFIED_CLAIMS: &str = "verified_claims";

/// The claims requested from one JSON object: the ID token or the UserInfo response.
///
/// Entries are unique by claim name and language tag. Insertion order is kept for
/// serialization but ignored by equality.
#[derive(Debug, Clone, Default)]
pub struct ClaimsSetRequest {
    entries: Vec<Entry>,
}

impl ClaimsSetRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries; a later entry replaces an earlier one with the same key.
    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Self {
        entries
            .into_iter()
            .fold(Self::default(), |set, entry| set.add(entry))
    }

    /// Add an entry, replacing any entry with the same claim name and language tag.
    pub fn add(mut self, entry: Entry) -> Self {
        match self
            .entries
            .iter_mut()
            .find(|e| e.matches(entry.claim_name(), entry.lang_tag()))
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Add a voluntary, unconstrained request for each claim name not already present.
    pub fn add_claim_names<I, S>(self, claim_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        claim_names.into_iter().fold(self, |set, name| {
            if set.get(name.as_ref(), None).is_some() {
                set
            } else {
                set.add(Entry::new(name.as_ref()))
            }
        })
    }

    /// Delete the entry with exactly this claim name and language tag. Without a language
    /// tag, only the untagged entry is removed.
    pub fn delete(mut self, claim_name: &str, lang_tag: Option<&LanguageTag>) -> Self {
        self.entries.retain(|e| !e.matches(claim_name, lang_tag));
        self
    }

    pub fn get(&self, claim_name: &str, lang_tag: Option<&LanguageTag>) -> Option<&Entry> {
        self.entries.iter().find(|e| e.matches(claim_name, lang_tag))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The requested claim names. With `include_lang_tag_suffix`, each language-tagged
    /// variant is listed as `name#tag`; otherwise variants collapse into the bare name.
    pub fn claim_names(&self, include_lang_tag_suffix: bool) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|e| {
                if include_lang_tag_suffix {
                    e.wire_key()
                } else {
                    e.claim_name().to_owned()
                }
            })
            .collect()
    }

    /// Combine with another claim set entry by entry, see [Entry::merge].
    pub fn merge(self, other: &ClaimsSetRequest) -> Self {
        other.entries.iter().fold(self, |set, entry| {
            let merged = match set.get(entry.claim_name(), entry.lang_tag()) {
                Some(existing) => existing.clone().merge(entry),
                None => entry.clone(),
            };
            set.add(merged)
        })
    }

    pub fn to_json_object(&self) -> Map<String, Json> {
        self.entries.iter().map(Entry::to_wire_entry).collect()
    }

    /// Parse every member as an [Entry], except `verified_claims`.
    pub fn parse(object: &Map<String, Json>) -> Result<Self, ClaimsError> {
        object
            .iter()
            .filter(|(key, _)| key.as_str() != VERIFIED_CLAIMS)
            .map(|(key, spec)| Entry::parse(key, spec))
            .try_fold(Self::default(), |set, entry| Ok(set.add(entry?)))
    }

    /// The voluntary claims implied by the scope: those of the standard OpenID Connect scope
    /// values and those mapped to a scope value in `custom_claims`.
    pub fn resolve(scope: &Scope, custom_claims: Option<&CustomClaimsByScope>) -> Self {
        scope.iter().fold(Self::default(), |set, value| {
            let set = match standard_scope_claims(value) {
                Some(names) => set.add_claim_names(names.iter()),
                None => set,
            };
            match custom_claims.and_then(|custom| custom.get(value)) {
                Some(names) => set.add_claim_names(names),
                None => set,
            }
        })
    }
}

impl PartialEq for ClaimsSetRequest {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|e| {
                other
                    .get(e.claim_name(), e.lang_tag())
                    .is_some_and(|o| o == e)
            })
    }
}

impl Eq for ClaimsSetRequest {}

impl FromIterator<Entry> for ClaimsSetRequest {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

impl ClaimsSet for ClaimsSetRequest {
    fn claims_set(&self) -> &ClaimsSetRequest {
        self
    }

    fn map_claims_set<F>(self, f: F) -> Self
    where
        F: FnOnce(ClaimsSetRequest) -> ClaimsSetRequest,
    {
        f(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::claims::ClaimRequirement;
    use serde_json::json;
    use std::collections::HashMap;

    fn lang(tag: &str) -> LanguageTag {
        LanguageTag::parse(tag).unwrap()
    }

    #[test]
    fn add_replaces_same_key() {
        let set = ClaimsSetRequest::new()
            .add(Entry::new("email"))
            .add(Entry::new("email").with_requirement(ClaimRequirement::Essential));
        assert_eq!(set.len(), 1);
        assert!(set.get("email", None).unwrap().is_essential());
    }

    #[test]
    fn language_variants_are_distinct() {
        let set = ClaimsSetRequest::new()
            .add(Entry::new("name"))
            .add(Entry::new("name").with_lang_tag(Some(lang("de"))))
            .add(Entry::new("name").with_lang_tag(Some(lang("ja-Kana"))));
        assert_eq!(set.len(), 3);
        assert_eq!(set.claim_names(false).len(), 1);
        assert_eq!(
            set.claim_names(true),
            ["name", "name#de", "name#ja-Kana"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<String>>()
        );
    }

    #[test]
    fn delete_without_tag_keeps_tagged_variants() {
        let set = ClaimsSetRequest::new()
            .add(Entry::new("name"))
            .add(Entry::new("name").with_lang_tag(Some(lang("de"))))
            .delete("name", None);
        assert_eq!(set.len(), 1);
        assert!(set.get("name", Some(&lang("de"))).is_some());

        let set = set.delete("name", None);
        assert_eq!(set.len(), 1);
        assert!(set.delete("name", Some(&lang("de"))).is_empty());
    }

    #[test]
    fn json_round_trip() {
        let json = json!({
            "email": {"essential": true},
            "email_verified": null,
            "name#de": null,
            "birthdate": {"value": "1970-01-01", "purpose": "Age check"},
        });
        let Json::Object(object) = json.clone() else {
            unreachable!()
        };
        let set = ClaimsSetRequest::parse(&object).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(Json::Object(set.to_json_object()), json);
        assert_eq!(ClaimsSetRequest::parse(&set.to_json_object()).unwrap(), set);
    }

    #[test]
    fn parse_skips_verified_claims() {
        let Json::Object(object) = json!({
            "email": null,
            "verified_claims": {"verification": {}, "claims": {"given_name": null}},
        }) else {
            unreachable!()
        };
        let set = ClaimsSetRequest::parse(&object).unwrap();
        assert_eq!(set.claim_names(false), BTreeSet::from(["email".to_string()]));
    }

    #[test]
    fn empty_set_is_empty_object() {
        assert!(ClaimsSetRequest::new().to_json_object().is_empty());
    }

    #[test]
    fn equality_ignores_order() {
        let a = ClaimsSetRequest::from_entries([Entry::new("a"), Entry::new("b")]);
        let b = ClaimsSetRequest::from_entries([Entry::new("b"), Entry::new("a")]);
        assert_eq!(a, b);
        assert_ne!(a, b.add(Entry::new("c")));
    }

    #[test]
    fn merge_promotes_essential() {
        let voluntary = ClaimsSetRequest::new().add(Entry::new("email"));
        let essential = ClaimsSetRequest::new()
            .add(Entry::new("email").with_requirement(ClaimRequirement::Essential));

        let merged = voluntary.merge(&essential);
        assert_eq!(merged.len(), 1);
        assert!(merged.get("email", None).unwrap().is_essential());

        let merged = essential.merge(&ClaimsSetRequest::new().add(Entry::new("email")));
        assert!(merged.get("email", None).unwrap().is_essential());
    }

    #[test]
    fn resolve_standard_and_custom_scopes() {
        let scope = Scope::new(["openid", "email", "https://example.com/loyalty"]);
        let custom: HashMap<String, Vec<String>> = HashMap::from([(
            "https://example.com/loyalty".to_string(),
            vec!["loyalty_level".to_string(), "email".to_string()],
        )]);

        let set = ClaimsSetRequest::resolve(&scope, Some(&custom));
        assert_eq!(
            set.claim_names(false),
            ["email", "email_verified", "loyalty_level"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<String>>()
        );
        assert!(set.entries().iter().all(|e| !e.is_essential()));

        assert!(ClaimsSetRequest::resolve(&Scope::new(["openid"]), None).is_empty());
    }
}
