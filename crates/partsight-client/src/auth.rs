//! Credential encodings for the upstream service.
//!
//! The upstream has rejected requests under encodings that previously
//! worked, so authentication is a probe over a fixed list of request
//! builders rather than a single known scheme. Each variant builds a
//! complete request; the dispatch loop in [`client`](crate::client) owns
//! the iteration and stop condition.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};

/// One candidate encoding of the API key into a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthVariant {
    /// Key sent verbatim in the `Authorization` header.
    RawKey,
    /// `Authorization: Bearer <key>`.
    BearerToken,
    /// `Authorization: API-Key <key>`.
    PrefixedKey,
    /// Key appended to the form body as a `key` field, no auth header.
    BodyKey,
}

impl AuthVariant {
    /// Probe order. Header encodings first; the body fallback last.
    pub const ALL: [AuthVariant; 4] = [
        AuthVariant::RawKey,
        AuthVariant::BearerToken,
        AuthVariant::PrefixedKey,
        AuthVariant::BodyKey,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AuthVariant::RawKey => "direct api key",
            AuthVariant::BearerToken => "bearer token",
            AuthVariant::PrefixedKey => "api-key prefix",
            AuthVariant::BodyKey => "key in body",
        }
    }

    /// Build a request against `url` carrying `fields` and the credential
    /// in this variant's encoding. POST sends the fields form-encoded in
    /// the body; anything else sends them as query parameters.
    pub fn request(
        self,
        http: &Client,
        method: Method,
        url: &str,
        fields: &[(&'static str, String)],
        key: &str,
    ) -> RequestBuilder {
        let mut fields: Vec<(&'static str, String)> = fields.to_vec();
        let mut builder = if method == Method::POST {
            http.post(url)
        } else {
            http.get(url)
        };

        match self {
            AuthVariant::RawKey => builder = builder.header(AUTHORIZATION, key),
            AuthVariant::BearerToken => {
                builder = builder.header(AUTHORIZATION, format!("Bearer {key}"));
            }
            AuthVariant::PrefixedKey => {
                builder = builder.header(AUTHORIZATION, format!("API-Key {key}"));
            }
            AuthVariant::BodyKey => fields.push(("key", key.to_string())),
        }

        if method == Method::POST {
            builder.form(&fields)
        } else {
            builder.query(&fields)
        }
    }
}
