use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
  #[default]
  Movie,
  Restaurant,
}

impl ItemType {
  /// Anything that is not a restaurant is treated as a movie.
  pub fn parse_lenient(value: &str) -> Self {
    if value.trim().eq_ignore_ascii_case("restaurant") {
      ItemType::Restaurant
    } else {
      ItemType::Movie
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ItemType::Movie => "movie",
      ItemType::Restaurant => "restaurant",
    }
  }
}

impl fmt::Display for ItemType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_values_fall_back_to_movie() {
    assert_eq!(ItemType::parse_lenient("Restaurant"), ItemType::Restaurant);
    assert_eq!(ItemType::parse_lenient(" restaurant "), ItemType::Restaurant);
    assert_eq!(ItemType::parse_lenient("movie"), ItemType::Movie);
    assert_eq!(ItemType::parse_lenient("tv"), ItemType::Movie);
    assert_eq!(ItemType::parse_lenient(""), ItemType::Movie);
  }
}
