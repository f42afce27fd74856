//! Authentication requests passed as a request object (OpenID Connect Core 1.0, Section 6).

use anyhow::Result;
use tracing::debug;

use super::{
    parameters::{ClientId, RequestObject, RequestUri, ResponseType},
    AuthenticationRequest,
};
use crate::core::{
    error::{AuthorizationRequestError, ErrorObject},
    jwt,
    object::{TypedParameter, UntypedObject},
};

/// Turns the `request` parameter into its claims.
///
/// Implementations verify the signature and decrypt as required by the deployment; the
/// claims are only read once this has succeeded.
pub trait RequestObjectDecoder {
    fn decode(&self, request_object: &str) -> Result<UntypedObject>;
}

/// Reads the claims of a request object without verifying it.
///
/// Only suitable for unsecured request objects, or where the request object was verified
/// before reaching this library.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnverifiedDecoder;

impl RequestObjectDecoder for UnverifiedDecoder {
    fn decode(&self, request_object: &str) -> Result<UntypedObject> {
        jwt::decode_claims_unverified(request_object).map(UntypedObject::from)
    }
}

impl AuthenticationRequest {
    /// Decode the `request` parameter, if any, and merge its claims into this request, see
    /// [AuthenticationRequest::merge_request_object].
    pub fn resolve_request_object<D: RequestObjectDecoder + ?Sized>(
        &self,
        decoder: &D,
    ) -> Result<Self, AuthorizationRequestError> {
        let Some(request_object) = &self.request_object else {
            return Ok(self.clone());
        };
        let claims = decoder.decode(&request_object.0).map_err(|e| {
            self.invalid_request_object(format!("Invalid request object: {e:#}"))
        })?;
        self.merge_request_object(claims)
    }

    /// Merge the claims of a request object, passed by value or fetched from `request_uri`,
    /// over the query parameters of this request. The request object wins; its `client_id`
    /// and `response_type`, when present, must match those of the query. The merged
    /// parameters are validated again as a whole.
    pub fn merge_request_object(
        &self,
        mut claims: UntypedObject,
    ) -> Result<Self, AuthorizationRequestError> {
        if let Some(client_id) = claims.get::<ClientId>() {
            if client_id.ok().as_ref() != Some(&self.client_id) {
                return Err(self.invalid_request_object(
                    "The \"client_id\" of the request object does not match the \"client_id\" parameter",
                ));
            }
        }
        if let Some(response_type) = claims.get::<ResponseType>() {
            if response_type.ok().as_ref() != Some(&self.response_type) {
                return Err(self.invalid_request_object(
                    "The \"response_type\" of the request object does not match the \"response_type\" parameter",
                ));
            }
        }

        let _ = claims.remove::<RequestObject>();
        let _ = claims.remove::<RequestUri>();
        let mut params = self.to_parameters();
        params.0.remove(RequestObject::KEY);
        params.0.remove(RequestUri::KEY);

        debug!(
            "merging {} request object parameter(s) for client '{}'",
            claims.len(),
            self.client_id
        );
        Self::parse(self.endpoint.clone(), params.overlay(claims))
    }

    fn invalid_request_object(&self, message: impl Into<String>) -> AuthorizationRequestError {
        let message = message.into();
        let error_object = ErrorObject::invalid_request_object().append_description(&message);
        self.error(message, error_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{claims::ClaimsSet, error::ErrorCode};
    use anyhow::bail;
    use serde_json::{json, Map, Value as Json};

    fn object(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(object) => object,
            _ => panic!("not an object"),
        }
    }

    fn request_with(request_object: &str) -> AuthenticationRequest {
        AuthenticationRequest::from_query(&format!(
            "response_type=code%20id_token&client_id=s6BhdRkqt3&scope=openid&request={request_object}"
        ))
        .unwrap()
    }

    #[test]
    fn request_object_wins_over_query() {
        let jwt = jwt::encode_unsecured(&object(json!({
            "client_id": "s6BhdRkqt3",
            "response_type": "code id_token",
            "redirect_uri": "https://client.example.org/cb",
            "scope": "openid email",
            "nonce": "n-0S6_WzA2Mj",
            "max_age": 86400,
            "claims": {"id_token": {"acr": {"essential": true, "values": ["urn:x"]}}},
        })));
        let request = request_with(&jwt);
        assert_eq!(request.nonce(), None);

        let resolved = request.resolve_request_object(&UnverifiedDecoder).unwrap();
        assert!(resolved.scope().contains("email"));
        assert_eq!(resolved.nonce().unwrap().0, "n-0S6_WzA2Mj");
        assert_eq!(resolved.request_object(), None);
        assert!(resolved
            .claims()
            .unwrap()
            .id_token_claims()
            .unwrap()
            .entry("acr", None)
            .is_some());
    }

    #[test]
    fn merged_request_is_validated() {
        let jwt = jwt::encode_unsecured(&object(json!({
            "redirect_uri": "https://client.example.org/cb",
        })));
        let err = request_with(&jwt)
            .resolve_request_object(&UnverifiedDecoder)
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Missing \"nonce\" parameter: Required in the implicit and hybrid flows"
        );
    }

    #[test]
    fn mismatched_client_id() {
        let jwt = jwt::encode_unsecured(&object(json!({"client_id": "other"})));
        let err = request_with(&jwt)
            .resolve_request_object(&UnverifiedDecoder)
            .unwrap_err();
        assert_eq!(err.error_object().code(), &ErrorCode::InvalidRequestObject);
        assert_eq!(err.client_id().unwrap().0, "s6BhdRkqt3");
    }

    #[test]
    fn decoder_failure() {
        struct Rejecting;

        impl RequestObjectDecoder for Rejecting {
            fn decode(&self, _: &str) -> Result<UntypedObject> {
                bail!("bad signature")
            }
        }

        let jwt = jwt::encode_unsecured(&Map::new());
        let err = request_with(&jwt).resolve_request_object(&Rejecting).unwrap_err();
        assert_eq!(err.message(), "Invalid request object: bad signature");
    }

    #[test]
    fn no_request_object_is_unchanged() {
        let request = AuthenticationRequest::from_query(
            "response_type=code&client_id=c&scope=openid&redirect_uri=https%3A%2F%2Fc.example%2Fcb",
        )
        .unwrap();
        assert_eq!(
            request.resolve_request_object(&UnverifiedDecoder).unwrap(),
            request
        );
    }
}
