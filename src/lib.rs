pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    InteractionService, PostCard, ReconcileOutcome, Reconciler, Viewer,
};
pub use infrastructure::cache::CollectionRegistry;
pub use shared::{AppConfig, AppError, Result};
pub use state::FeedState;
