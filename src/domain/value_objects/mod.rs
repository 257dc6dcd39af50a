pub mod collection_key;
pub mod post_id;

pub use collection_key::{CollectionKey, CollectionKind};
pub use post_id::PostId;
