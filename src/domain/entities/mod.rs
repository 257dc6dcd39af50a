pub mod collection;
pub mod post;
pub mod post_card;

pub use collection::{
    CachedCollection, PostPage, RemovedEntry, patch_paged_or_single, reinsert_into_paged,
    remove_from_paged,
};
pub use post::{
    AuthorSummary, FeedPost, InteractionState, Post, PostRecord, RepostShell,
    resolve_display_target,
};
pub use post_card::{ActionKind, PostCardState, apply_like_toggle, apply_repost_toggle};
