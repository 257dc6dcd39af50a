pub mod interaction_service;
pub mod post_card;
pub mod reconciler;

pub use interaction_service::{InteractionService, Viewer};
pub use post_card::PostCard;
pub use reconciler::{ReconcileOutcome, Reconciler};
