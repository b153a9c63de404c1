mod foursquare;
mod nominatim;
mod tmdb;

pub use self::foursquare::FoursquareClient;
pub use self::nominatim::NominatimClient;
pub use self::tmdb::TmdbClient;

use crate::providers::ProviderError;

/// Percent-encodes an id for use as a single URL path segment.
pub(crate) fn urlencode(segment: &str) -> String {
  urlencoding::encode(segment).into_owned()
}

/// Turns a non-success response into [`ProviderError::Status`] with the body kept for debugging.
async fn check(
  provider: &'static str,
  res: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
  if res.status().is_success() {
    return Ok(res);
  }

  let status = res.status().as_u16();
  let body = res.text().await.unwrap_or_default();

  Err(ProviderError::Status {
    provider,
    status,
    body,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_stay_within_one_path_segment() {
    assert_eq!(urlencode("557"), "557");
    assert_eq!(urlencode("4b5a/../x y"), "4b5a%2F..%2Fx%20y");
  }
}
