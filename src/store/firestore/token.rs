use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, SystemTimeError};

use async_mutex::Mutex;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ServiceAccount;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Google OAuth token.
#[derive(Deserialize)]
pub struct Token {
  /// Token expiration in seconds.
  pub expires_in: u64,
  pub access_token: String,
}

#[derive(Error, Debug)]
pub enum TokenError {
  #[error(transparent)]
  Time(#[from] SystemTimeError),
  #[error(transparent)]
  Transport(#[from] reqwest::Error),
  #[error("could not sign assertion: {0}")]
  Signing(#[from] jsonwebtoken::errors::Error),
  #[error("access denied: {0}")]
  AccessDenied(String),
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
  iss: &'a str,
  scope: &'a str,
  aud: &'a str,
  iat: u64,
  exp: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
  error: String,
  #[serde(default)]
  error_description: Option<String>,
}

/// Exchanges a signed service-account assertion for an access token and keeps
/// it until shortly before it expires.
pub struct TokenManager {
  account: ServiceAccount,
  client: reqwest::Client,
  token: Mutex<Option<String>>,
  token_expiration: AtomicU64,
}

impl TokenManager {
  pub fn new(account: ServiceAccount, client: reqwest::Client) -> Self {
    Self {
      account,
      client,
      token: Mutex::new(None),
      token_expiration: AtomicU64::new(0),
    }
  }

  /// Gets a valid access token, fetching a new one when the cached one is stale.
  pub async fn get_token(&self) -> Result<String, TokenError> {
    let now = SystemTime::now();
    let expiration =
      SystemTime::UNIX_EPOCH + Duration::from_secs(self.token_expiration.load(Ordering::SeqCst));

    if now > expiration {
      return self.fetch_token().await;
    }

    {
      let token = self.token.lock().await;
      if let Some(token) = token.deref() {
        return Ok(token.to_string());
      }
    }

    self.fetch_token().await
  }

  fn assertion(&self) -> Result<String, TokenError> {
    let iat = SystemTime::now()
      .duration_since(SystemTime::UNIX_EPOCH)?
      .as_secs();

    let claims = AssertionClaims {
      iss: &self.account.client_email,
      scope: DATASTORE_SCOPE,
      aud: &self.account.token_uri,
      iat,
      exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
  }

  async fn fetch_token(&self) -> Result<String, TokenError> {
    let assertion = self.assertion()?;

    let res = self
      .client
      .post(&self.account.token_uri)
      .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
      .send()
      .await?;

    if res.status() != StatusCode::OK {
      return Err(res.json::<TokenErrorResponse>().await?.into());
    }

    let token: Token = res.json().await?;
    let expires_at = SystemTime::now()
      .duration_since(SystemTime::UNIX_EPOCH)?
      .as_secs()
      + token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);

    *self.token.lock().await = Some(token.access_token.clone());
    self.token_expiration.store(expires_at, Ordering::SeqCst);

    Ok(token.access_token)
  }
}

impl From<TokenErrorResponse> for TokenError {
  fn from(res: TokenErrorResponse) -> TokenError {
    TokenError::AccessDenied(res.error_description.unwrap_or(res.error))
  }
}
