use openid_messages::core::{
    acr::AcrRequest,
    authorization_request::{
        parameters::{Acr, ResponseMode},
        request_object::UnverifiedDecoder,
        AuthenticationRequest,
    },
    claims::{ClaimsRequest, ClaimsSet},
    error::ErrorCode,
    jwt,
    object::UntypedObject,
    userinfo::UserInfo,
};
use serde_json::{json, Value as Json};
use url::Url;

mod provider;

fn encode(value: &Json) -> String {
    url::form_urlencoded::byte_serialize(value.to_string().as_bytes()).collect()
}

#[test]
fn implicit_request_without_nonce() {
    let err = AuthenticationRequest::from_query(
        "response_type=id_token%20token&client_id=s6BhdRkqt3\
         &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb&scope=openid%20profile\
         &state=af0ifjsldkj",
    )
    .unwrap_err();

    assert_eq!(
        err.message(),
        "Missing \"nonce\" parameter: Required in the implicit and hybrid flows"
    );
    assert_eq!(err.error_object().code(), &ErrorCode::InvalidRequest);
    assert_eq!(err.response_mode(), Some(&ResponseMode::Fragment));
    assert_eq!(err.state().unwrap().0, "af0ifjsldkj");

    let redirect = err.to_redirect_url().unwrap().unwrap();
    assert_eq!(redirect.query(), None);
    let fragment = redirect.fragment().unwrap();
    assert!(fragment.starts_with("error=invalid_request&error_description="));
    assert!(fragment.ends_with("&state=af0ifjsldkj"));
}

#[test]
fn code_flow_claims_resolution() {
    let claims = json!({
        "id_token": {
            "acr": {"essential": true, "values": [provider::SILVER]},
            "given_name": {"essential": true},
        },
        "userinfo": {
            "verified_claims": {
                "verification": {"trust_framework": "de_aml"},
                "claims": {"family_name": null, "birthdate": {"purpose": "To verify your age"}},
            },
        },
    });
    let url = Url::parse(&format!(
        "https://server.example.com/authorize?response_type=code&client_id=s6BhdRkqt3\
         &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb\
         &scope=openid%20email%20https%3A%2F%2Fexample.com%2Floyalty&state=xyz&claims={}",
        encode(&claims)
    ))
    .unwrap();

    let request = AuthenticationRequest::from_url(&url).unwrap();
    assert_eq!(
        request.endpoint().unwrap().as_str(),
        "https://server.example.com/authorize"
    );

    let metadata = provider::metadata();
    let config = provider::config();
    metadata.check_request(&request).unwrap();

    let acr_request = AcrRequest::resolve(&request);
    assert_eq!(acr_request.essential(), &[Acr::new(provider::SILVER)]);
    acr_request
        .ensure_acr_support(&request, &config.supported_acr_values)
        .unwrap();

    let resolved = ClaimsRequest::resolve_with_config(&request, &config);
    let userinfo_claims = resolved.userinfo_claims().unwrap();
    assert_eq!(
        userinfo_claims.claim_names(false).into_iter().collect::<Vec<_>>(),
        vec!["email", "email_verified", "loyalty_tier", "points"]
    );
    let id_token_claims = resolved.id_token_claims().unwrap();
    assert!(id_token_claims.get("given_name", None).unwrap().is_essential());
    assert!(id_token_claims.get("acr", None).is_some());

    let verified = resolved.userinfo_verified_claims();
    assert_eq!(verified.len(), 1);
    assert_eq!(
        verified[0].verification().as_object()["trust_framework"],
        json!("de_aml")
    );
    assert_eq!(
        verified[0].entry("birthdate", None).unwrap().purpose(),
        Some("To verify your age")
    );

    let userinfo: UserInfo = serde_json::from_value(json!({
        "sub": "248289761001",
        "email": "janedoe@example.com",
        "email_verified": true,
        "points": 1200,
        "phone_number": "+1 (310) 123-4567",
    }))
    .unwrap();
    let released = userinfo.filter(userinfo_claims);
    assert_eq!(released.email(), Some("janedoe@example.com"));
    assert_eq!(released.get_raw("points"), Some(&json!(1200)));
    assert_eq!(released.phone_number(), None);
}

#[test]
fn request_object_by_reference() {
    let request = AuthenticationRequest::from_query(
        "response_type=code%20id_token&client_id=s6BhdRkqt3&scope=openid\
         &request_uri=https%3A%2F%2Fclient.example.org%2Frequest.jwt",
    )
    .unwrap();
    provider::metadata().check_request(&request).unwrap();

    let Json::Object(claims) = json!({
        "iss": "s6BhdRkqt3",
        "aud": "https://server.example.com",
        "redirect_uri": "https://client.example.org/cb",
        "nonce": "n-0S6_WzA2Mj",
        "max_age": 86400,
        "claims": {"userinfo": {"email": {"essential": true}}},
    }) else {
        unreachable!()
    };
    let fetched = jwt::decode_claims_unverified(&jwt::encode_unsecured(&claims)).unwrap();
    let merged = request
        .merge_request_object(UntypedObject::from(fetched))
        .unwrap();

    assert_eq!(merged.request_uri(), None);
    assert_eq!(merged.nonce().unwrap().0, "n-0S6_WzA2Mj");
    assert_eq!(merged.max_age().unwrap().0, 86400);
    assert_eq!(merged.custom_parameter("iss"), Some(&json!("s6BhdRkqt3")));

    let resolved = ClaimsRequest::resolve_for(&merged, None);
    assert!(resolved.id_token_claims().is_none());
    assert!(resolved
        .userinfo_claims()
        .unwrap()
        .get("email", None)
        .unwrap()
        .is_essential());
}

#[test]
fn request_object_by_value_is_checked() {
    let Json::Object(claims) = json!({"client_id": "someone-else"}) else {
        unreachable!()
    };
    let query = format!(
        "response_type=code&client_id=s6BhdRkqt3&scope=openid\
         &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb&request={}",
        jwt::encode_unsecured(&claims)
    );
    let request = AuthenticationRequest::from_query(&query).unwrap();
    let err = request
        .resolve_request_object(&UnverifiedDecoder)
        .unwrap_err();
    assert_eq!(err.error_object().code(), &ErrorCode::InvalidRequestObject);
    assert!(err.to_redirect_url().unwrap().unwrap().query().is_some());
}

#[test]
fn client_request_round_trip() {
    let claims: ClaimsRequest = r#"{"userinfo":{"email":null,"name#de":{"essential":true}}}"#
        .parse()
        .unwrap();
    let request = AuthenticationRequest::from_query(&format!(
        "response_type=code&client_id=s6BhdRkqt3&scope=openid\
         &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb&ui_locales=de%20en\
         &x-custom=1&claims={}",
        encode(&Json::Object(claims.to_json_object()))
    ))
    .unwrap();
    assert_eq!(request.claims(), Some(&claims));

    let url = request
        .to_url(Some(
            &Url::parse("https://server.example.com/authorize").unwrap(),
        ))
        .unwrap();
    let reparsed = AuthenticationRequest::from_url(&url).unwrap();
    assert_eq!(reparsed.claims(), Some(&claims));
    assert_eq!(reparsed.custom_parameter("x-custom"), Some(&json!("1")));
    assert_eq!(reparsed.ui_locales(), request.ui_locales());
}
