use async_mutex::Mutex;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

lazy_static! {
  static ref MAX_AGE_REGEX: Regex = Regex::new(r"max-age=(?P<secs>\d+)").unwrap();
}

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum KeyType {
  #[serde(rename = "RSA")]
  Rsa,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum KeyAlgorithm {
  RS256,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
  #[serde(rename = "kty")]
  _kty: KeyType,
  #[serde(rename = "alg")]
  _alg: KeyAlgorithm,
  pub kid: String,
  pub n: String,
  pub e: String,
}

impl Jwk {
  pub fn rs256(kid: &str, n: &str, e: &str) -> Self {
    Self {
      _kty: KeyType::Rsa,
      _alg: KeyAlgorithm::RS256,
      kid: kid.to_owned(),
      n: n.to_owned(),
      e: e.to_owned(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
  pub keys: Vec<Jwk>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
  #[error("no signing key with id {0}")]
  UnknownKey(String),
  #[error("fetching signing keys failed: {0}")]
  Fetch(#[from] reqwest::Error),
}

struct CachedKeys {
  jwks: Jwks,
  expires_at: Instant,
}

impl CachedKeys {
  fn find(&self, kid: &str) -> Option<Jwk> {
    self.jwks.keys.iter().find(|jwk| jwk.kid == kid).cloned()
  }
}

/// The identity provider's token signing keys, cached for as long as its
/// `Cache-Control` header allows and refetched when an unknown key id shows up.
pub struct KeyCache {
  client: reqwest::Client,
  jwks_url: Option<String>,
  cached: Mutex<Option<CachedKeys>>,
}

fn max_age(cache_control: Option<&str>) -> Duration {
  cache_control
    .and_then(|value| MAX_AGE_REGEX.captures(value))
    .and_then(|captures| captures.name("secs"))
    .and_then(|secs| secs.as_str().parse::<u64>().ok())
    .map(Duration::from_secs)
    .unwrap_or(DEFAULT_MAX_AGE)
}

async fn fetch_jwks(client: &reqwest::Client, jwks_url: &str) -> Result<CachedKeys, reqwest::Error> {
  let res = client.get(jwks_url).send().await?.error_for_status()?;
  let ttl = max_age(
    res
      .headers()
      .get(CACHE_CONTROL)
      .and_then(|value| value.to_str().ok()),
  );
  let jwks = res.json::<Jwks>().await?;

  debug!(keys = jwks.keys.len(), ttl_secs = ttl.as_secs(), "fetched signing keys");

  Ok(CachedKeys {
    jwks,
    expires_at: Instant::now() + ttl,
  })
}

impl KeyCache {
  pub fn new(client: reqwest::Client, jwks_url: &str) -> Self {
    Self {
      client,
      jwks_url: Some(jwks_url.to_owned()),
      cached: Mutex::new(None),
    }
  }

  /// A fixed key set that is never refetched.
  pub fn with_keys(jwks: Jwks) -> Self {
    Self {
      client: reqwest::Client::new(),
      jwks_url: None,
      cached: Mutex::new(Some(CachedKeys {
        jwks,
        expires_at: Instant::now() + Duration::from_secs(365 * 24 * 60 * 60),
      })),
    }
  }

  pub async fn find(&self, kid: &str) -> Result<Jwk, KeyError> {
    let mut cached = self.cached.lock().await;

    if let Some(keys) = cached.as_ref() {
      if keys.expires_at > Instant::now() {
        if let Some(jwk) = keys.find(kid) {
          return Ok(jwk);
        }
      }
    }

    let Some(jwks_url) = &self.jwks_url else {
      return cached
        .as_ref()
        .and_then(|keys| keys.find(kid))
        .ok_or_else(|| KeyError::UnknownKey(kid.to_owned()));
    };

    let keys = fetch_jwks(&self.client, jwks_url).await?;
    let jwk = keys.find(kid);
    *cached = Some(keys);

    jwk.ok_or_else(|| KeyError::UnknownKey(kid.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_max_age_from_cache_control() {
    assert_eq!(
      max_age(Some("public, max-age=19917, must-revalidate, no-transform")),
      Duration::from_secs(19917)
    );
    assert_eq!(max_age(Some("no-cache")), DEFAULT_MAX_AGE);
    assert_eq!(max_age(None), DEFAULT_MAX_AGE);
  }

  #[test]
  fn parses_google_jwks() {
    let jwks: Jwks = serde_json::from_str(
      r#"{"keys":[{"kty":"RSA","alg":"RS256","use":"sig","kid":"abc","n":"xyz","e":"AQAB"}]}"#,
    )
    .unwrap();
    assert_eq!(jwks.keys[0].kid, "abc");
  }

  #[rocket::async_test]
  async fn fixed_key_sets_report_unknown_ids() {
    let cache = KeyCache::with_keys(Jwks {
      keys: vec![Jwk::rs256("known", "n", "AQAB")],
    });

    assert_eq!(cache.find("known").await.unwrap().kid, "known");
    assert!(matches!(cache.find("other").await, Err(KeyError::UnknownKey(_))));
  }
}
