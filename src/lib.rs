//! This library provides Rust data structures for [OpenID Connect Core 1.0] messages,
//! centered on the Authentication Request and its `claims` parameter, including the
//! verified claims of [OpenID Connect for Identity Assurance 1.0].
//!
//! [OpenID Connect Core 1.0]: <https://openid.net/specs/openid-connect-core-1_0.html>
//! [OpenID Connect for Identity Assurance 1.0]: <https://openid.net/specs/openid-ida-verified-claims-1_0.html>
//!
//! # Provider Usage
//!
//! An OpenID Provider parses the parameters received at its authorization endpoint, checks
//! them against its metadata, then resolves which claims it must release:
//!
//! ```ignore
//! use openid_messages::config::Config;
//! use openid_messages::core::authorization_request::AuthenticationRequest;
//! use openid_messages::core::authorization_request::request_object::UnverifiedDecoder;
//! use openid_messages::core::acr::AcrRequest;
//! use openid_messages::core::claims::ClaimsRequest;
//!
//! let request = AuthenticationRequest::from_url(&url)
//!     .and_then(|request| request.resolve_request_object(&UnverifiedDecoder))
//!     .and_then(|request| {
//!         provider_metadata.check_request(&request)?;
//!         Ok(request)
//!     });
//!
//! let request = match request {
//!     Ok(request) => request,
//!     // Send the error back to the client when it can be trusted with it.
//!     Err(e) => return redirect_or_display(e.to_redirect_url(), e.message()),
//! };
//!
//! AcrRequest::resolve(&request).ensure_acr_support(&request, &config.supported_acr_values)?;
//! let claims = ClaimsRequest::resolve_with_config(&request, &config);
//! ```
//!
//! # Client Usage
//!
//! Clients build requests with an [`AuthenticationRequestBuilder`]:
//!
//! ```
//! use openid_messages::core::authorization_request::{
//!     parameters::{ClientId, Nonce, ResponseType, Scope},
//!     AuthenticationRequest,
//! };
//! use openid_messages::core::claims::{ClaimsRequest, ClaimsSetRequest, Entry};
//! use url::Url;
//!
//! let claims = ClaimsRequest::new()
//!     .with_userinfo_claims(ClaimsSetRequest::new().add(Entry::new("email")));
//!
//! let request = AuthenticationRequest::builder(
//!     ResponseType::id_token(),
//!     Scope::new(["openid", "email"]),
//!     ClientId("s6BhdRkqt3".into()),
//!     Some(Url::parse("https://client.example.org/cb").unwrap()),
//! )
//! .with_nonce(Nonce::random())
//! .with_claims(claims)
//! .build()
//! .unwrap();
//!
//! let url = request
//!     .to_url(Some(&Url::parse("https://server.example.com/authorize").unwrap()))
//!     .unwrap();
//! assert!(url.query().unwrap().contains("claims="));
//! ```
//!
//! [`AuthenticationRequestBuilder`]: crate::core::authorization_request::AuthenticationRequestBuilder
//!
//! # Claims Resolution
//!
//! The claims released for a request come from two sources, merged into one
//! [`ClaimsRequest`]:
//!
//! 1. *Scope values*: `profile`, `email`, `address` and `phone` stand for their standard
//!    claims, and [`Config::custom_claims`] adds claims for other scope values.
//! 2. *The `claims` parameter*: explicit requests, possibly essential, constrained to
//!    values, language-tagged or wrapped in `verified_claims`.
//!
//! Scope-derived claims go to the ID token when the response type only issues an ID token,
//! and to the UserInfo endpoint otherwise. All the code related to claims is located in the
//! [`core::claims`] module.
//!
//! [`ClaimsRequest`]: crate::core::claims::ClaimsRequest
//! [`Config::custom_claims`]: crate::config::Config::custom_claims
//! [`core::claims`]: crate::core::claims

pub mod config;
pub mod core;
pub mod utils;
