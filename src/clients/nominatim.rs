use super::check;
use crate::config::Config;
use crate::providers::{GeocodeRecord, Geocoder, ProviderError};
use reqwest::header::USER_AGENT;

const PROVIDER: &str = "nominatim";

/// OpenStreetMap Nominatim. Needs no key, but its usage policy requires an identifying user agent.
pub struct NominatimClient {
  client: reqwest::Client,
  base_url: String,
  user_agent: String,
}

impl NominatimClient {
  pub fn new(config: &Config, client: reqwest::Client) -> Self {
    Self {
      client,
      base_url: config.nominatim_base_url.trim_end_matches('/').to_owned(),
      user_agent: config.nominatim_user_agent.clone(),
    }
  }
}

#[rocket::async_trait]
impl Geocoder for NominatimClient {
  async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodeRecord>, ProviderError> {
    let limit = limit.to_string();

    let res = self
      .client
      .get(format!("{}/search", self.base_url))
      .header(USER_AGENT, &self.user_agent)
      .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
      .send()
      .await?;

    Ok(check(PROVIDER, res).await?.json::<Vec<GeocodeRecord>>().await?)
  }
}
