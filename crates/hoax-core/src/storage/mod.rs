mod rows;
pub mod schema;
pub mod store;

mod store_internal;

pub use schema::GAME_SCHEMA;
pub use store::{DeletedStory, Store};
