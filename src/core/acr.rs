use tracing::debug;

use super::{
    authorization_request::{parameters::Acr, AuthenticationRequest},
    error::{AuthorizationRequestError, ErrorObject},
};

const ACR_CLAIM: &str = "acr";

/// The ACR values requested by a client, split into essential and voluntary ones.
///
/// `acr_values` only ever yields voluntary ACRs. An `acr` claim requested for the ID token
/// yields essential ACRs when marked essential, voluntary ones otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcrRequest {
    essential: Vec<Acr>,
    voluntary: Vec<Acr>,
}

impl AcrRequest {
    pub fn new(essential: Vec<Acr>, voluntary: Vec<Acr>) -> Self {
        Self {
            essential,
            voluntary,
        }
    }

    pub fn resolve(request: &AuthenticationRequest) -> Self {
        let mut acr_request = Self::default();

        if let Some(acr_values) = request.acr_values() {
            for acr in acr_values.0.iter() {
                push_unique(&mut acr_request.voluntary, acr.clone());
            }
        }

        let entry = request
            .claims()
            .and_then(|claims| claims.id_token_claims())
            .and_then(|claims| claims.get(ACR_CLAIM, None));
        if let Some(entry) = entry {
            let values: Vec<Acr> = match (entry.value_as_str(), entry.values_as_strs()) {
                (Some(value), _) => vec![Acr::new(value)],
                (None, Some(values)) => values.into_iter().map(Acr::new).collect(),
                (None, None) => Vec::new(),
            };
            let target = if entry.is_essential() {
                &mut acr_request.essential
            } else {
                &mut acr_request.voluntary
            };
            for acr in values {
                push_unique(target, acr);
            }
        }

        acr_request
    }

    pub fn is_empty(&self) -> bool {
        self.essential.is_empty() && self.voluntary.is_empty()
    }

    pub fn essential(&self) -> &[Acr] {
        &self.essential
    }

    pub fn voluntary(&self) -> &[Acr] {
        &self.voluntary
    }

    /// Ensure that, when essential ACRs are requested, at least one of them is supported.
    ///
    /// The error is `access_denied`, addressed to the client of `request`.
    pub fn ensure_acr_support(
        &self,
        request: &AuthenticationRequest,
        supported: &[Acr],
    ) -> Result<(), AuthorizationRequestError> {
        if self.essential.is_empty() || self.essential.iter().any(|acr| supported.contains(acr))
        {
            return Ok(());
        }
        debug!(
            "none of the essential ACRs {:?} requested by '{}' is supported",
            self.essential,
            request.client_id()
        );
        let message = "Requested essential ACR(s) not supported";
        Err(request.error(message, ErrorObject::access_denied().append_description(message)))
    }
}

fn push_unique(acrs: &mut Vec<Acr>, acr: Acr) {
    if !acrs.contains(&acr) {
        acrs.push(acr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCode;

    fn request(extra: &str) -> AuthenticationRequest {
        AuthenticationRequest::from_query(&format!(
            "response_type=code&client_id=s6BhdRkqt3&scope=openid\
             &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb&state=xyz{extra}"
        ))
        .unwrap()
    }

    fn claims(json: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();
        format!("&claims={encoded}")
    }

    #[test]
    fn acr_values_are_voluntary() {
        let acr_request = AcrRequest::resolve(&request("&acr_values=urn%3Aa%20urn%3Ab"));
        assert!(acr_request.essential().is_empty());
        assert_eq!(acr_request.voluntary(), &[Acr::new("urn:a"), Acr::new("urn:b")]);
    }

    #[test]
    fn essential_acr_claim() {
        let acr_request = AcrRequest::resolve(&request(&claims(
            r#"{"id_token":{"acr":{"essential":true,"values":["urn:x","urn:z"]}}}"#,
        )));
        assert_eq!(acr_request.essential(), &[Acr::new("urn:x"), Acr::new("urn:z")]);
        assert!(acr_request.voluntary().is_empty());

        let acr_request = AcrRequest::resolve(&request(&claims(
            r#"{"id_token":{"acr":{"value":"urn:x"}}}"#,
        )));
        assert_eq!(acr_request.voluntary(), &[Acr::new("urn:x")]);
    }

    #[test]
    fn unsupported_essential_acr_is_denied() {
        let request = request(&claims(
            r#"{"id_token":{"acr":{"essential":true,"values":["urn:x"]}}}"#,
        ));
        let acr_request = AcrRequest::resolve(&request);

        let err = acr_request
            .ensure_acr_support(&request, &[Acr::new("urn:y")])
            .unwrap_err();
        assert_eq!(err.error_object().code(), &ErrorCode::AccessDenied);
        assert_eq!(err.message(), "Requested essential ACR(s) not supported");
        assert_eq!(err.state().unwrap().0, "xyz");

        assert!(acr_request
            .ensure_acr_support(&request, &[Acr::new("urn:y"), Acr::new("urn:x")])
            .is_ok());
    }

    #[test]
    fn voluntary_acrs_always_pass() {
        let request = request("&acr_values=urn%3Ax");
        assert!(AcrRequest::resolve(&request)
            .ensure_acr_support(&request, &[])
            .is_ok());
    }
}
