pub mod collection_registry;

pub use collection_registry::{CollectionRegistry, RefetchTicket};
