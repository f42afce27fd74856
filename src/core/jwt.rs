//! Minimal handling of compact JWTs.
//!
//! Signature verification and decryption are the business of the caller; this module only
//! splits a compact serialization and decodes its JSON segments.

use anyhow::{bail, Context, Result};
use base64::prelude::*;
use serde_json::{Map, Value as Json};

/// Decode the header of a compact JWS (three segments) or JWE (five segments).
pub fn decode_header(jwt: &str) -> Result<Map<String, Json>> {
    let segments = split(jwt)?;
    decode_segment(segments[0]).context("invalid JWT header")
}

/// Decode the claims of a compact JWS without checking its signature.
pub fn decode_claims_unverified(jwt: &str) -> Result<Map<String, Json>> {
    let segments = split(jwt)?;
    if segments.len() == 5 {
        bail!("the claims of an encrypted JWT cannot be read before decryption")
    }
    decode_segment(segments[1]).context("invalid JWT claims set")
}

/// Encode an unsecured (`"alg": "none"`) JWT carrying the given claims.
pub fn encode_unsecured(claims: &Map<String, Json>) -> String {
    let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let payload = BASE64_URL_SAFE_NO_PAD.encode(Json::Object(claims.clone()).to_string());
    format!("{header}.{payload}.")
}

fn split(jwt: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = jwt.split('.').collect();
    if !matches!(segments.len(), 3 | 5) {
        bail!("invalid serialized JWT: expected 3 or 5 segments, found {}", segments.len())
    }
    Ok(segments)
}

fn decode_segment(segment: &str) -> Result<Map<String, Json>> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .context("segment is not base64url encoded")?;
    let Json::Object(map) = serde_json::from_slice::<Json>(&bytes)? else {
        bail!("segment is not a JSON object")
    };
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unsecured_jwt_round_trip() {
        let Json::Object(claims) = json!({"iss": "s6BhdRkqt3", "nonce": "n-0S6_WzA2Mj"}) else {
            unreachable!()
        };
        let jwt = encode_unsecured(&claims);

        assert_eq!(decode_header(&jwt).unwrap().get("alg"), Some(&json!("none")));
        assert_eq!(decode_claims_unverified(&jwt).unwrap(), claims);
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = decode_header("abc.def").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid serialized JWT: expected 3 or 5 segments, found 2"
        );
    }

    #[test]
    fn rejects_non_json_header() {
        let header = BASE64_URL_SAFE_NO_PAD.encode("not json");
        assert!(decode_header(&format!("{header}.e30.")).is_err());
    }

    #[test]
    fn encrypted_claims_are_opaque() {
        let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"RSA-OAEP","enc":"A128GCM"}"#);
        let jwe = format!("{header}.a.b.c.d");
        assert!(decode_header(&jwe).is_ok());
        assert!(decode_claims_unverified(&jwe).is_err());
    }
}
