use super::iso_timestamp;
use crate::data_types::ItemType;
use crate::models::SearchHistoryEntry;
use serde::Serialize;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryView {
  pub id: String,
  pub item_id: Option<String>,
  pub item_name: Option<String>,
  pub item_type: ItemType,
  pub created_at: Option<String>,
}

impl From<SearchHistoryEntry> for SearchHistoryView {
  fn from(entry: SearchHistoryEntry) -> Self {
    SearchHistoryView {
      id: entry.id,
      item_id: entry.item_id,
      item_name: entry.item_name,
      item_type: entry.item_type,
      created_at: iso_timestamp(entry.created_at),
    }
  }
}
