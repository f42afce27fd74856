pub mod acr;
pub mod authorization_request;
pub mod claims;
pub mod error;
pub mod jwt;
pub mod logout_token;
pub mod metadata;
pub mod object;
pub mod userinfo;
