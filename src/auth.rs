use crate::oidc::KeyCache;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// The identity behind a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
  pub id: String,
  pub email: Option<String>,
}

impl Principal {
  /// Value denormalized into reviews as `username`.
  pub fn display_name(&self) -> String {
    self
      .email
      .clone()
      .filter(|email| !email.is_empty())
      .unwrap_or_else(|| "Anonymous".to_owned())
  }
}

#[derive(Error, Debug)]
pub enum AuthError {
  #[error("No token")]
  Missing,
  /// The reason is kept for logs only; clients just see "Invalid token".
  #[error("Invalid token")]
  Invalid(String),
}

impl AuthError {
  pub fn reason(&self) -> &str {
    match self {
      AuthError::Missing => "missing or malformed authorization header",
      AuthError::Invalid(reason) => reason,
    }
  }
}

#[rocket::async_trait]
pub trait CredentialVerifier: Send + Sync {
  async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Managed-state handle for the configured verifier.
pub struct Verifier(pub Arc<dyn CredentialVerifier>);

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Claims {
  pub sub: String,
  #[serde(default)]
  pub email: Option<String>,
}

/// Verifies Firebase Authentication ID tokens.
pub struct FirebaseVerifier {
  project_id: String,
  keys: KeyCache,
}

impl FirebaseVerifier {
  pub fn new(project_id: &str, keys: KeyCache) -> Self {
    Self {
      project_id: project_id.to_owned(),
      keys,
    }
  }

  fn issuer(&self) -> String {
    format!("https://securetoken.google.com/{}", self.project_id)
  }
}

#[rocket::async_trait]
impl CredentialVerifier for FirebaseVerifier {
  async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
    let header = decode_header(token).map_err(|e| AuthError::Invalid(e.to_string()))?;

    if header.alg != Algorithm::RS256 {
      return Err(AuthError::Invalid(format!("unexpected algorithm {:?}", header.alg)));
    }

    let kid = header
      .kid
      .ok_or_else(|| AuthError::Invalid("token has no key id".to_string()))?;

    let jwk = self
      .keys
      .find(&kid)
      .await
      .map_err(|e| AuthError::Invalid(e.to_string()))?;

    let key =
      DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| AuthError::Invalid(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[&self.project_id]);
    validation.set_issuer(&[self.issuer()]);

    let claims = decode::<Claims>(token, &key, &validation)
      .map_err(|e| AuthError::Invalid(e.to_string()))?
      .claims;

    if claims.sub.is_empty() {
      return Err(AuthError::Invalid("empty subject".to_string()));
    }

    Ok(Principal {
      id: claims.sub,
      email: claims.email,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::oidc::{Jwk, Jwks};
  use jsonwebtoken::{encode, EncodingKey, Header};
  use std::time::{SystemTime, UNIX_EPOCH};

  const SIGNING_KEY: &[u8] = include_bytes!("../tests/fixtures/signing_key.pem");
  const MODULUS: &str = "lhVF54z6aYO8la-UHJIoLAHoYnOhj7HAfEA6uzc0uAoF_8i5-QnDI_1QInX-cYMkO0ZgCvw7Hm8Yf_eiEeO2zr_3o_jflr-4OuYh2S8ke3LWzC7GQ6p4A-EVrq3tF1zoRacBHhOW4P71n3FFFdvZUjTC1Fw2e_CioKa13mAF-HBJvkYr-2gI3kXdUY29g14e2dImgJSnGMeMZtRv9_MJR7f4RRjQH7WV_kdghB6AdpC9rM7tOvnSsmHYyRnbCz8o07B476AGjirufFRWlGePVhUBGj5SNVigh9tZLeSI73_zN3Xf6YH2vZJ0l8Bj3mGJKLqrNcvxqXyrjx0yk7OSTQ";
  const EXPONENT: &str = "AQAB";

  #[derive(Serialize)]
  struct TestClaims<'a> {
    sub: &'a str,
    email: Option<&'a str>,
    aud: &'a str,
    iss: String,
    exp: u64,
  }

  fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
  }

  fn verifier() -> FirebaseVerifier {
    let keys = KeyCache::with_keys(Jwks {
      keys: vec![Jwk::rs256("test-key", MODULUS, EXPONENT)],
    });
    FirebaseVerifier::new("reviewhub-test", keys)
  }

  fn sign(kid: &str, aud: &str, exp: u64) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_owned());
    let claims = TestClaims {
      sub: "user-1",
      email: Some("u1@example.com"),
      aud,
      iss: "https://securetoken.google.com/reviewhub-test".to_owned(),
      exp,
    };
    encode(&header, &claims, &EncodingKey::from_rsa_pem(SIGNING_KEY).unwrap()).unwrap()
  }

  #[rocket::async_test]
  async fn accepts_a_valid_id_token() {
    let token = sign("test-key", "reviewhub-test", now() + 3600);
    let principal = verifier().verify(&token).await.unwrap();

    assert_eq!(principal.id, "user-1");
    assert_eq!(principal.email.as_deref(), Some("u1@example.com"));
  }

  #[rocket::async_test]
  async fn rejects_tokens_for_another_project() {
    let token = sign("test-key", "someone-else", now() + 3600);
    assert!(matches!(verifier().verify(&token).await, Err(AuthError::Invalid(_))));
  }

  #[rocket::async_test]
  async fn rejects_expired_tokens() {
    let token = sign("test-key", "reviewhub-test", now() - 3600);
    assert!(matches!(verifier().verify(&token).await, Err(AuthError::Invalid(_))));
  }

  #[rocket::async_test]
  async fn rejects_unknown_keys_and_garbage() {
    let token = sign("rotated-away", "reviewhub-test", now() + 3600);
    assert!(matches!(verifier().verify(&token).await, Err(AuthError::Invalid(_))));
    assert!(matches!(verifier().verify("not-a-jwt").await, Err(AuthError::Invalid(_))));
  }

  #[test]
  fn anonymous_when_there_is_no_email() {
    let principal = Principal {
      id: "u".into(),
      email: None,
    };
    assert_eq!(principal.display_name(), "Anonymous");
  }
}
