/// Metadata published by the OpenID Provider, also known as the Discovery document.
pub mod provider;
