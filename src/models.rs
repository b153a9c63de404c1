pub mod review;
pub mod search_history;

pub use review::{NewReview, Review, ReviewChangeset};
pub use search_history::{NewSearchHistoryEntry, SearchHistoryEntry};
