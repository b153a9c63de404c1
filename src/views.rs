mod feed;
mod review;
mod search_history;

pub use feed::{HomeMoviesView, SearchView};
pub use review::{MyReviewsView, ReviewView, SuccessView, UserReviewsView};
pub use search_history::SearchHistoryView;

use chrono::{DateTime, SecondsFormat, Utc};

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub(crate) fn iso_timestamp(timestamp: Option<DateTime<Utc>>) -> Option<String> {
  timestamp.map(|timestamp| timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn timestamps_render_like_javascript_iso_strings() {
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    assert_eq!(
      iso_timestamp(Some(timestamp)).as_deref(),
      Some("2024-05-01T12:00:00.000Z")
    );
    assert_eq!(iso_timestamp(None), None);
  }
}
