//! Shared test fixtures: Ed25519 and RS256 token signers and a mock key-set endpoint.
use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use ed25519_dalek::{Signer, SigningKey};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUER: &str = "test-issuer";
pub const AUDIENCE: &str = "test-audience";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Registered claims for a token valid for the next hour.
pub fn claims(subject: &str) -> Value {
    let now = now();
    json!({
        "sub": subject,
        "iss": ISSUER,
        "aud": [AUDIENCE],
        "iat": now,
        "nbf": now,
        "exp": now + 3600,
    })
}

fn b64url_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string().as_bytes())
}

pub struct TestSigner {
    kid: String,
    key: SigningKey,
}

impl TestSigner {
    pub fn new(seed: u8, kid: &str) -> Self {
        Self {
            kid: kid.to_string(),
            key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    pub fn jwk(&self) -> Value {
        json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "kid": self.kid,
            "alg": "EdDSA",
            "use": "sig",
            "x": URL_SAFE_NO_PAD.encode(self.key.verifying_key().as_bytes()),
        })
    }

    pub fn jwks(&self) -> Value {
        json!({ "keys": [self.jwk()] })
    }

    pub fn sign(&self, claims: &Value) -> String {
        let header = json!({ "alg": "EdDSA", "typ": "JWT", "kid": self.kid });
        self.sign_with_header(&header, claims)
    }

    /// Signs "base64url(header).base64url(payload)" as-is.
    pub fn sign_with_header(&self, header: &Value, claims: &Value) -> String {
        let signing_input = format!("{}.{}", b64url_json(header), b64url_json(claims));
        let signature = self.key.sign(signing_input.as_bytes());
        format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }
}

// Fixed 2048-bit RSA test key (PKCS#1 DER, base64) and its public modulus.
const RSA_PRIVATE_KEY_DER: &str = concat!(
    "MIIEogIBAAKCAQEAwtsFRAitRW8bRgpglJHwryPGSgijfIgQ3FRBhpcLf1YNOYj/9Qw1sOU6",
    "dYcUxNMEh5x2ro9eIfgUoIEgzX/t9UfmVShcrupMfs5H2s5QereNvPn/CQdEjfggeK1+MkrX",
    "NMSSQ6dwS8OXqSY3jpNgJ07TAzSUsJTV2iTgZOJ+OQkrMkqpyKlIhc5MYI5C5mtkmsUBU98y",
    "16A2Mycd1Bg/nL8XNlD3WrB9JGgZrRJnhu8j1UrR+viQNCQ4hhih9GdN4WhA8asbAcuAf6f0",
    "29h212B0rKRNqFBnRMkjYUZxRX4Dv8Qmclf27UkXX9hFbVfgmUOnn7+DS51OhCAlUO2RLwID",
    "AQABAoIBADzPp7wMzS6fNy7LrEqRpUCzdH3EZmlF+aUZcn2zg/YQf/4VwHPUhKkZUP4+0v9+",
    "L6q27N8bhTAqwR06T2dy5munLb4j45D/NDJa5FfoDXvO7yAsESjbKMz5xACFfJ3rd3BTbKZK",
    "iiRK/XjfoXUQj3CVDAuzDDhzqq3y1kkF2oinxWYJcBX+p/q1U66+GPXBSC0SEyWUEATriInS",
    "wFg0L7RNW7zE5kon2NZUIO2G2UiUU8Pvi27ZvZrBJttQ45UjZyQxM5qVObV56dE9HXIY6FMH",
    "qLF6aedjFMWEkpnJVy778/z3e4bOSxQTFQ0NeojxV26Q/9Iscfpm6w0RZtfvSHECgYEA5pp7",
    "7f2uIN41oUVBLI93d8RsgGaLzWPCSPbkIGKpEbsENsiZ92bDv2lpZmDyi7eUpXB8PzQTNIko",
    "rUu96yO0lZRXPmxdg36UVCjO+wdVkU4WmIh3ysviMy9qJhVjRF8+6P+cYMkWiv307Y6EVU4N",
    "GL18j958y9gIpQQsrkIhW3cCgYEA2FCtpqJ0s/XIef2zzShTahXji/Vb1mOjez4/iIofaaeK",
    "PK+k0AbF3W67eJY2YNFF/MUEc8f4XW0xEbyngQ53nQ7EfIv5/ZA2XlQIPf4JYZNaHByGYyv5",
    "GNpDig1xfQamZ01ywJae6Kg+29Nfu9KxUt4wIF02f6RvFPd3JvxL9gkCgYB2taYAcKvX3awL",
    "9gPD9aLRc7tLKf7j32vfdcEf7soMB5L2xLOFyVARVCle+59AT2Pk+o/rVVphnA3lj+0Xg8zt",
    "h2yWBODq1Rl0bYGHdlIVN/an1PCd4/Dw2oKxUidExiczeIo+xKWnLW6Nb+UtqL1TNBBQW38w",
    "zGg+0nRRzFcxpwKBgCGLaVJk8PoTTFJ2oFJZRY429MF4fBRkAS8UeR/AY5yryYkdp85Grppn",
    "GJVbnfUnntXS65zUztQWIbzhZ4xg5PWrG5dA0bSbj4LTPy/13BiQlDG1zrVEVW2gM0cOTKIZ",
    "zOZKIVhyQxRLOuw1/CuRQcRbBlWOfuwOYNd8hLK7/z+ZAoGAYMN6j/FFqE/jaJnLslTSoMtD",
    "lY55R+OzAVwlHhlaghPlHdVa/CsFV4AxCSMS25neSsFO4yY4JYqlBnwUGTs5hi97M9vnrCfO",
    "cEjimoqLgukwRSTKbGRjT0JjQg93HaS7gw4Plt8KujBfaKj1Xnf63gbQMgcIQREpv6Xe8S++",
    "rJk=",
);
const RSA_N: &str = concat!(
    "wtsFRAitRW8bRgpglJHwryPGSgijfIgQ3FRBhpcLf1YNOYj_9Qw1sOU6dYcUxNMEh5x2ro9e",
    "IfgUoIEgzX_t9UfmVShcrupMfs5H2s5QereNvPn_CQdEjfggeK1-",
    "MkrXNMSSQ6dwS8OXqSY3jpNgJ07TAzSUsJTV2iTgZOJ-OQkrMkqpyKlIhc5MYI5C5mtkmsUB",
    "U98y16A2Mycd1Bg_nL8XNlD3WrB9JGgZrRJnhu8j1UrR-viQNCQ4hhih9GdN4WhA8asbAcuA",
    "f6f029h212B0rKRNqFBnRMkjYUZxRX4Dv8Qmclf27UkXX9hFbVfgmUOnn7-",
    "DS51OhCAlUO2RLw",
);

/// RS256 signer backed by the fixed test RSA key.
pub struct RsaTestSigner {
    kid: String,
    key: EncodingKey,
}

impl RsaTestSigner {
    pub fn new(kid: &str) -> Self {
        let der = STANDARD.decode(RSA_PRIVATE_KEY_DER).unwrap();
        Self {
            kid: kid.to_string(),
            key: EncodingKey::from_rsa_der(&der),
        }
    }

    pub fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "kid": self.kid,
            "alg": "RS256",
            "use": "sig",
            "n": RSA_N,
            "e": "AQAB",
        })
    }

    pub fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());
        jsonwebtoken::encode(&header, claims, &self.key).unwrap()
    }
}

/// Serves `jwks` at [`JWKS_PATH`]; returns the server and the full URL.
pub async fn jwks_server(jwks: &Value) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), JWKS_PATH);
    (server, url)
}
