//! The OpenID Connect `claims` request parameter.
//!
//! A [ClaimsRequest] names the claims a client wants returned in the ID token and from the
//! UserInfo endpoint. Each side holds at most one plain [ClaimsSetRequest] and any number of
//! [VerifiedClaimsSetRequest]s (OpenID Connect for Identity Assurance). Every value in this
//! module is immutable: the `with_*`, `add`, `delete` and `merge` operations return new
//! values.

use std::collections::{BTreeSet, HashMap};

use language_tags::LanguageTag;

pub mod entry;
pub mod request;
pub mod set;
pub mod verified;

pub use entry::Entry;
pub use request::{delivers_claims_via_id_token, ClaimsRequest};
pub use set::ClaimsSetRequest;
pub use verified::{VerificationSpec, VerifiedClaimsSetRequest};

/// Whether a requested claim is essential for the client, or merely wanted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClaimRequirement {
    #[default]
    Voluntary,
    Essential,
}

/// Claim names released for each scope value, in addition to the standard OpenID Connect
/// scopes. Keyed by scope value.
pub type CustomClaimsByScope = HashMap<String, Vec<String>>;

/// Claims of the standard OpenID Connect scope values (OpenID Connect Core 1.0, Section 5.4).
pub const STANDARD_SCOPE_CLAIMS: &[(&str, &[&str])] = &[
    (
        "profile",
        &[
            "name",
            "family_name",
            "given_name",
            "middle_name",
            "nickname",
            "preferred_username",
            "profile",
            "picture",
            "website",
            "gender",
            "birthdate",
            "zoneinfo",
            "locale",
            "updated_at",
        ],
    ),
    ("email", &["email", "email_verified"]),
    ("address", &["address"]),
    ("phone", &["phone_number", "phone_number_verified"]),
];

/// The claim names of a standard scope value, if it is one.
pub fn standard_scope_claims(scope_value: &str) -> Option<&'static [&'static str]> {
    STANDARD_SCOPE_CLAIMS
        .iter()
        .find(|(scope, _)| *scope == scope_value)
        .map(|(_, claims)| *claims)
}

/// The claim-set capability shared by plain and verified claims requests.
pub trait ClaimsSet: Sized {
    fn claims_set(&self) -> &ClaimsSetRequest;

    /// Replace the underlying claim set with the result of `f`.
    fn map_claims_set<F>(self, f: F) -> Self
    where
        F: FnOnce(ClaimsSetRequest) -> ClaimsSetRequest;

    fn entry(&self, claim_name: &str, lang_tag: Option<&LanguageTag>) -> Option<&Entry> {
        self.claims_set().get(claim_name, lang_tag)
    }

    fn entries(&self) -> &[Entry] {
        self.claims_set().entries()
    }

    fn claim_names(&self, include_lang_tag_suffix: bool) -> BTreeSet<String> {
        self.claims_set().claim_names(include_lang_tag_suffix)
    }

    fn with_entry(self, entry: Entry) -> Self {
        self.map_claims_set(|set| set.add(entry))
    }

    fn without_entry(self, claim_name: &str, lang_tag: Option<&LanguageTag>) -> Self {
        self.map_claims_set(|set| set.delete(claim_name, lang_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scopes_cover_nineteen_claims() {
        let total: usize = STANDARD_SCOPE_CLAIMS.iter().map(|(_, c)| c.len()).sum();
        assert_eq!(total, 19);
        assert_eq!(
            standard_scope_claims("phone"),
            Some(&["phone_number", "phone_number_verified"][..])
        );
        assert_eq!(standard_scope_claims("openid"), None);
    }

    #[test]
    fn essential_outranks_voluntary() {
        assert!(ClaimRequirement::Essential > ClaimRequirement::Voluntary);
        assert_eq!(ClaimRequirement::default(), ClaimRequirement::Voluntary);
    }
}
