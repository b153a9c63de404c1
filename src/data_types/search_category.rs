/// Category requested by `/api/search` and `/api/items/<id>`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SearchCategory {
  Movie,
  /// TMDB multi search (movies, tv and people in one list).
  Multi,
  Restaurant,
}

impl SearchCategory {
  pub fn parse(value: Option<&str>) -> Self {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
      Some("restaurant") => SearchCategory::Restaurant,
      Some("multi") => SearchCategory::Multi,
      _ => SearchCategory::Movie,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_case_insensitively_and_defaults_to_movie() {
    assert_eq!(SearchCategory::parse(None), SearchCategory::Movie);
    assert_eq!(SearchCategory::parse(Some("RESTAURANT")), SearchCategory::Restaurant);
    assert_eq!(SearchCategory::parse(Some("Multi")), SearchCategory::Multi);
    assert_eq!(SearchCategory::parse(Some("tv")), SearchCategory::Movie);
  }
}
