pub mod entities;
pub mod value_objects;

pub use entities::{CachedCollection, FeedPost, Post, PostPage};
pub use value_objects::{CollectionKey, CollectionKind, PostId};
