use super::{check, urlencode};
use crate::config::Config;
use crate::data_types::CuratedList;
use crate::providers::{MovieCatalog, ProviderError};
use serde::Deserialize;
use serde_json::Value;

const PROVIDER: &str = "tmdb";

#[derive(Deserialize)]
struct Page {
  #[serde(default)]
  results: Vec<Value>,
}

pub struct TmdbClient {
  client: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
}

impl TmdbClient {
  pub fn new(config: &Config, client: reqwest::Client) -> Self {
    Self {
      client,
      base_url: config.tmdb_base_url.trim_end_matches('/').to_owned(),
      api_key: config.tmdb_api_key.clone().filter(|key| !key.is_empty()),
    }
  }

  async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Response, ProviderError> {
    let api_key = self
      .api_key
      .as_deref()
      .ok_or(ProviderError::NotConfigured("TMDB_API_KEY"))?;

    let res = self
      .client
      .get(format!("{}/{}", self.base_url, path))
      .query(&[("api_key", api_key)])
      .query(params)
      .send()
      .await?;

    check(PROVIDER, res).await
  }
}

#[rocket::async_trait]
impl MovieCatalog for TmdbClient {
  async fn search(&self, query: &str, multi: bool) -> Result<Vec<Value>, ProviderError> {
    let path = if multi { "search/multi" } else { "search/movie" };
    let page = self.get(path, &[("query", query)]).await?.json::<Page>().await?;
    Ok(page.results)
  }

  async fn details(&self, id: &str) -> Result<Value, ProviderError> {
    let path = format!("movie/{}", urlencode(id));
    Ok(self.get(&path, &[]).await?.json::<Value>().await?)
  }

  async fn curated(&self, list: CuratedList, page: u32) -> Result<Vec<Value>, ProviderError> {
    let page = page.to_string();
    let body = self
      .get(list.path(), &[("page", page.as_str())])
      .await?
      .json::<Page>()
      .await?;
    Ok(body.results)
  }
}
