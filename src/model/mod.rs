pub mod collection;
pub mod rawuri;
pub mod timemap;

pub use collection::CollectionModel;
pub use timemap::{TimeMap, TimeMapEntry};
