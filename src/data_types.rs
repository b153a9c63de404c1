mod curated_list;
mod item_type;
mod search_category;

pub use curated_list::CuratedList;
pub use item_type::ItemType;
pub use search_category::SearchCategory;
