pub mod collection_loader;
pub mod content_service;
pub mod notifier;

pub use collection_loader::CollectionLoader;
pub use content_service::{ContentService, LikeState, RepostRecord};
pub use notifier::{Notification, NotificationLevel, Notifier};
