use super::{check, urlencode};
use crate::config::Config;
use crate::providers::{PlaceDirectory, ProviderError};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;

const PROVIDER: &str = "foursquare";

#[derive(Deserialize)]
struct SearchResponse {
  #[serde(default)]
  results: Vec<Value>,
}

pub struct FoursquareClient {
  client: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
}

impl FoursquareClient {
  pub fn new(config: &Config, client: reqwest::Client) -> Self {
    Self {
      client,
      base_url: config.foursquare_base_url.trim_end_matches('/').to_owned(),
      api_key: config.foursquare_api_key.clone().filter(|key| !key.is_empty()),
    }
  }

  fn request(&self, path: &str) -> Result<reqwest::RequestBuilder, ProviderError> {
    let api_key = self
      .api_key
      .as_deref()
      .ok_or(ProviderError::NotConfigured("FOURSQUARE_API_KEY"))?;

    Ok(
      self
        .client
        .get(format!("{}/{}", self.base_url, path))
        .header(ACCEPT, "application/json")
        .header(AUTHORIZATION, api_key),
    )
  }
}

#[rocket::async_trait]
impl PlaceDirectory for FoursquareClient {
  async fn search(
    &self,
    query: &str,
    near: Option<&str>,
    limit: usize,
  ) -> Result<Vec<Value>, ProviderError> {
    let limit = limit.to_string();
    let mut params = vec![("query", query), ("limit", limit.as_str())];
    if let Some(near) = near {
      params.push(("near", near));
    }

    let res = self.request("places/search")?.query(&params).send().await?;
    let body = check(PROVIDER, res).await?.json::<SearchResponse>().await?;

    Ok(body.results)
  }

  async fn details(&self, id: &str) -> Result<Value, ProviderError> {
    let path = format!("places/{}", urlencode(id));
    let res = self.request(&path)?.send().await?;

    Ok(check(PROVIDER, res).await?.json::<Value>().await?)
  }
}
