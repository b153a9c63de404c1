use crate::auth::Principal;
use crate::data_types::ItemType;
use crate::store::{Document, FieldValue, Fields};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHistoryEntry {
  pub id: String,
  pub user_id: Option<String>,
  pub item_id: Option<String>,
  pub item_name: Option<String>,
  pub item_type: ItemType,
  pub created_at: Option<DateTime<Utc>>,
}

impl From<Document> for SearchHistoryEntry {
  fn from(document: Document) -> Self {
    SearchHistoryEntry {
      user_id: document.string("userId"),
      item_id: document.string("itemId"),
      item_name: document.string("itemName"),
      item_type: document
        .string("itemType")
        .map(|value| ItemType::parse_lenient(&value))
        .unwrap_or_default(),
      created_at: document.timestamp("createdAt"),
      id: document.id,
    }
  }
}

pub struct NewSearchHistoryEntry {
  pub user_id: String,
  pub item_id: Option<String>,
  pub item_name: Option<String>,
  pub item_type: Option<String>,
}

impl NewSearchHistoryEntry {
  pub fn new(principal: &Principal) -> Self {
    Self {
      user_id: principal.id.clone(),
      item_id: None,
      item_name: None,
      item_type: None,
    }
  }

  pub fn into_fields(self) -> Fields {
    let mut fields = Fields::new();
    fields.insert("userId".into(), self.user_id.into());
    fields.insert("itemId".into(), self.item_id.into());
    fields.insert("itemName".into(), self.item_name.into());
    fields.insert("itemType".into(), self.item_type.into());
    fields.insert("createdAt".into(), FieldValue::ServerTimestamp);
    fields
  }
}
