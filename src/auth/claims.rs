// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compact token parsing and claim representation.

use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::{Map, Value};
use uuid::Uuid;

/// How issuer identifiers are formatted in a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssuerFormat {
    /// Any non-blank string.
    #[default]
    Any,
    /// A hyphenated or simple UUID.
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown issuer format {0:?}, expected `any` or `uuid`")]
pub struct ParseIssuerFormatError(String);

impl FromStr for IssuerFormat {
    type Err = ParseIssuerFormatError;

    /// Parse the configuration value (`any` or `uuid`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" | "string" => Ok(Self::Any),
            "uuid" | "guid" => Ok(Self::Uuid),
            _ => Err(ParseIssuerFormatError(value.to_string())),
        }
    }
}

impl IssuerFormat {
    /// Normalise an issuer claim, returning `None` if it is not well formed.
    ///
    /// UUID issuers are canonicalised to lowercase hyphenated form so that
    /// lookups do not depend on how the client spelled the identifier.
    pub fn normalise(&self, issuer: &str) -> Option<String> {
        if issuer.trim().is_empty() {
            return None;
        }
        match self {
            Self::Any => Some(issuer.to_string()),
            Self::Uuid => Uuid::parse_str(issuer)
                .ok()
                .map(|id| id.hyphenated().to_string()),
        }
    }
}

/// The claims the gate cares about, decoded once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    /// Issuer (calling client application). `None` if absent or not a string.
    pub iss: Option<String>,
    /// Audience. `None` if absent or not a single string.
    pub aud: Option<String>,
    /// Expiration as a Unix timestamp.
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Pick the typed claims out of a decoded claims object.
    ///
    /// Returns `None` when `exp` is present but not numeric.
    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let exp = match object.get("exp") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?),
            Some(_) => return None,
        };

        Some(Self {
            iss: object.get("iss").and_then(Value::as_str).map(str::to_string),
            aud: object.get("aud").and_then(Value::as_str).map(str::to_string),
            exp,
        })
    }

    /// Whether `exp` is set and lies strictly before `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now)
    }
}

/// A structurally valid `header.claims.signature` token.
///
/// Parsing checks shape only; the signature is not verified here. The
/// header only has to be a JSON object, so an odd or missing `alg` surfaces
/// later as a signature failure rather than as an undecodable token.
#[derive(Debug, Clone)]
pub struct CompactToken<'a> {
    alg: Option<String>,
    claims: TokenClaims,
    signing_input: &'a str,
    signature: &'a str,
}

impl<'a> CompactToken<'a> {
    /// Parse a compact token.
    ///
    /// Requires exactly three segments and header and claims segments that
    /// each decode to a JSON object.
    pub fn parse(token: &'a str) -> Option<Self> {
        let mut segments = token.split('.');
        let (Some(header_segment), Some(claims_segment), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };

        let header_json = Base64UrlUnpadded::decode_vec(header_segment).ok()?;
        let header: Map<String, Value> = serde_json::from_slice(&header_json).ok()?;
        let alg = header.get("alg").and_then(Value::as_str).map(str::to_string);

        let claims_json = Base64UrlUnpadded::decode_vec(claims_segment).ok()?;
        let object: Map<String, Value> = serde_json::from_slice(&claims_json).ok()?;
        let claims = TokenClaims::from_object(&object)?;

        let signing_input = &token[..token.len() - signature.len() - 1];

        Some(Self {
            alg,
            claims,
            signing_input,
            signature,
        })
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Algorithm declared in the JOSE header, if it is a string.
    pub fn algorithm(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    /// `header.claims`, the bytes covered by the signature.
    pub fn signing_input(&self) -> &'a str {
        self.signing_input
    }

    pub fn signature(&self) -> &'a str {
        self.signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::Base64UrlUnpadded;
    use serde_json::json;

    fn segment(value: &Value) -> String {
        Base64UrlUnpadded::encode_string(value.to_string().as_bytes())
    }

    fn token_with(claims: Value) -> String {
        format!(
            "{}.{}.c2ln",
            segment(&json!({"alg": "HS256", "typ": "JWT"})),
            segment(&claims)
        )
    }

    #[test]
    fn parses_typed_claims() {
        let token = token_with(json!({"iss": "client-a", "aud": "platform", "exp": 1700000000}));
        let parsed = CompactToken::parse(&token).unwrap();

        assert_eq!(
            parsed.claims(),
            &TokenClaims {
                iss: Some("client-a".to_string()),
                aud: Some("platform".to_string()),
                exp: Some(1700000000),
            }
        );
        assert_eq!(parsed.algorithm(), Some("HS256"));
        assert_eq!(parsed.signature(), "c2ln");
        assert!(token.starts_with(parsed.signing_input()));
        assert_eq!(parsed.signing_input().len() + 5, token.len());
    }

    #[test]
    fn non_string_issuer_is_absent() {
        let token = token_with(json!({"iss": 42, "aud": ["a", "b"]}));
        let parsed = CompactToken::parse(&token).unwrap();
        assert_eq!(parsed.claims().iss, None);
        assert_eq!(parsed.claims().aud, None);
        assert_eq!(parsed.claims().exp, None);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(CompactToken::parse("").is_none());
        assert!(CompactToken::parse("only.two").is_none());
        assert!(CompactToken::parse("a.b.c.d").is_none());

        let header = segment(&json!({"alg": "HS256"}));
        let not_object = format!("{header}.{}.sig", segment(&json!(["iss"])));
        assert!(CompactToken::parse(&not_object).is_none());

        let not_json = format!("{header}.{}.sig", Base64UrlUnpadded::encode_string(b"nope"));
        assert!(CompactToken::parse(&not_json).is_none());

        let bad_exp = token_with(json!({"iss": "a", "exp": "tomorrow"}));
        assert!(CompactToken::parse(&bad_exp).is_none());

        let claims = segment(&json!({"iss": "a"}));
        let array_header = format!("{}.{claims}.sig", segment(&json!(["HS256"])));
        assert!(CompactToken::parse(&array_header).is_none());
        let garbled_header = format!("***.{claims}.sig");
        assert!(CompactToken::parse(&garbled_header).is_none());
    }

    #[test]
    fn header_only_needs_to_be_an_object() {
        let claims = segment(&json!({"iss": "client-a"}));
        for (header, alg) in [
            (json!({"alg": "none"}), Some("none")),
            (json!({"typ": "JWT"}), None),
            (json!({"alg": 256}), None),
            (json!({"alg": "HS256", "typ": "JWT", "ver": 1, "crit": []}), Some("HS256")),
        ] {
            let token = format!("{}.{claims}.sig", segment(&header));
            let parsed = CompactToken::parse(&token).unwrap();
            assert_eq!(parsed.algorithm(), alg, "{header}");
            assert_eq!(parsed.claims().iss.as_deref(), Some("client-a"));
        }
    }

    #[test]
    fn expiry_comparison() {
        let claims = TokenClaims {
            exp: Some(100),
            ..Default::default()
        };
        assert!(claims.is_expired_at(101));
        assert!(!claims.is_expired_at(100));
        assert!(!TokenClaims::default().is_expired_at(i64::MAX));
    }

    #[test]
    fn issuer_formats() {
        assert_eq!(IssuerFormat::Any.normalise("client"), Some("client".to_string()));
        assert_eq!(IssuerFormat::Any.normalise("   "), None);

        let id = "6F9619FF-8B86-D011-B42D-00C04FC964FF";
        assert_eq!(
            IssuerFormat::Uuid.normalise(id),
            Some("6f9619ff-8b86-d011-b42d-00c04fc964ff".to_string())
        );
        assert_eq!(IssuerFormat::Uuid.normalise("client"), None);

        assert_eq!("GUID".parse::<IssuerFormat>(), Ok(IssuerFormat::Uuid));
        assert_eq!(" any ".parse::<IssuerFormat>(), Ok(IssuerFormat::Any));
        assert!("other".parse::<IssuerFormat>().is_err());
    }
}
