use serde::Deserialize;

use crate::core::{authorization_request::parameters::Acr, claims::CustomClaimsByScope};

/// Settings of an OpenID Provider that drive claims and ACR resolution.
///
/// Deserializable from any serde format; members left out take their default.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Claim names released for non-standard scope values.
    pub custom_claims: CustomClaimsByScope,
    /// ACR values that can be satisfied when requested as essential.
    pub supported_acr_values: Vec<Acr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize() {
        let config: Config = serde_json::from_value(json!({
            "custom_claims": {"https://example.com/loyalty": ["loyalty_tier", "points"]},
            "supported_acr_values": ["urn:mace:incommon:iap:silver"],
        }))
        .unwrap();
        assert_eq!(
            config.custom_claims["https://example.com/loyalty"],
            vec!["loyalty_tier", "points"]
        );
        assert_eq!(
            config.supported_acr_values,
            vec![Acr::new("urn:mace:incommon:iap:silver")]
        );
    }

    #[test]
    fn members_default() {
        let config: Config = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.custom_claims.is_empty());
    }
}
