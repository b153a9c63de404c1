mod home;
mod index;
mod items;
mod reviews;
mod search;
mod users;

pub use home::build as home;
pub use index::build as index;
pub use items::build as items;
pub use reviews::build as reviews;
pub use search::build as search;
pub use users::build as users;
