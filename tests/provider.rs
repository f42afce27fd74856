use openid_messages::{config::Config, core::metadata::ProviderMetadata};
use serde_json::json;

pub const LOYALTY_SCOPE: &str = "https://example.com/loyalty";
pub const SILVER: &str = "urn:mace:incommon:iap:silver";

pub fn metadata() -> ProviderMetadata {
    serde_json::from_value(json!({
        "issuer": "https://server.example.com",
        "authorization_endpoint": "https://server.example.com/authorize",
        "token_endpoint": "https://server.example.com/token",
        "userinfo_endpoint": "https://server.example.com/userinfo",
        "jwks_uri": "https://server.example.com/jwks.json",
        "scopes_supported": ["openid", "profile", "email", LOYALTY_SCOPE],
        "response_types_supported": ["code", "id_token", "id_token token", "code id_token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "acr_values_supported": [SILVER],
        "claims_parameter_supported": true,
        "request_parameter_supported": true,
        "verified_claims_supported": true,
        "trust_frameworks_supported": ["de_aml"],
    }))
    .unwrap()
}

pub fn config() -> Config {
    serde_json::from_value(json!({
        "custom_claims": {"https://example.com/loyalty": ["loyalty_tier", "points"]},
        "supported_acr_values": [SILVER],
    }))
    .unwrap()
}
