use crate::domain::entities::post_card::apply_interaction;
use crate::domain::entities::{ActionKind, FeedPost, PostCardState};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 描画中の投稿カード 1 枚分のローカル状態へのハンドル
#[derive(Clone)]
pub struct PostCard {
    state: Arc<RwLock<PostCardState>>,
}

impl PostCard {
    pub fn new(post: FeedPost) -> Self {
        Self {
            state: Arc::new(RwLock::new(PostCardState::new(post))),
        }
    }

    /// 表示中のローカルコピー
    pub async fn current(&self) -> FeedPost {
        self.state.read().await.local.clone()
    }

    /// 親リストから最後に受け取った投稿
    pub async fn canonical(&self) -> FeedPost {
        self.state.read().await.canonical.clone()
    }

    /// 親が新しい投稿を渡してきたときに呼ぶ
    pub async fn sync_from_parent(&self, post: FeedPost) {
        self.state.write().await.sync_from_parent(post);
    }

    /// ローカルコピーを変換し、変換前のスナップショットを返す
    pub async fn apply(&self, transform: impl FnOnce(&FeedPost) -> FeedPost) -> (FeedPost, FeedPost) {
        let mut state = self.state.write().await;
        let snapshot = state.local.clone();
        state.local = transform(&snapshot);
        (snapshot, state.local.clone())
    }

    /// 失敗した操作を巻き戻す。
    ///
    /// `optimistic` の適用後に誰も触っていなければスナップショットそのものに戻す。
    /// 並行して別の操作が確定していた場合は、失敗した操作のフィールドだけを戻す。
    pub async fn rollback(&self, kind: ActionKind, snapshot: &FeedPost, optimistic: &FeedPost) {
        let mut state = self.state.write().await;
        if &state.local == optimistic {
            state.restore(snapshot.clone());
        } else {
            let previous = snapshot.display_target().interaction;
            state.local = apply_interaction(&state.local, kind, &previous);
        }
    }

    pub async fn snapshot(&self) -> PostCardState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        AuthorSummary, InteractionState, Post, apply_like_toggle, apply_repost_toggle,
    };
    use crate::domain::value_objects::PostId;
    use chrono::Utc;

    fn sample(likes: u32) -> FeedPost {
        FeedPost::Original(Post {
            id: PostId::new("p").unwrap(),
            author_id: "author".to_string(),
            author: AuthorSummary {
                id: "author".to_string(),
                username: "author".to_string(),
                display_name: "Author".to_string(),
                avatar_url: None,
            },
            content: "hello".to_string(),
            media: Vec::new(),
            quoted_post_id: None,
            quoted: None,
            interaction: InteractionState {
                likes_count: likes,
                ..Default::default()
            },
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_apply_then_rollback_returns_exact_snapshot() {
        let card = PostCard::new(sample(5));
        let (snapshot, patched) = card.apply(apply_like_toggle).await;

        assert_eq!(patched.display_target().interaction.likes_count, 6);
        assert_eq!(card.current().await, patched);

        card.rollback(ActionKind::Like, &snapshot, &patched).await;
        assert_eq!(card.current().await, snapshot);
        assert_eq!(card.current().await, card.canonical().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let card = PostCard::new(sample(1));
        let other = card.clone();
        card.apply(apply_like_toggle).await;
        assert!(other.current().await.display_target().interaction.is_liked);
    }

    #[tokio::test]
    async fn test_parent_sync_wins() {
        let card = PostCard::new(sample(1));
        card.apply(apply_like_toggle).await;
        card.sync_from_parent(sample(9)).await;
        let state = card.snapshot().await;
        assert_eq!(state.local, state.canonical);
        assert_eq!(state.local.display_target().interaction.likes_count, 9);
    }

    #[tokio::test]
    async fn test_rollback_keeps_other_committed_action() {
        let card = PostCard::new(sample(5));
        let (like_snapshot, like_patched) = card.apply(apply_like_toggle).await;
        card.apply(apply_repost_toggle).await;

        card.rollback(ActionKind::Like, &like_snapshot, &like_patched).await;

        let state = card.current().await.display_target().interaction;
        assert_eq!((state.is_liked, state.likes_count), (false, 5));
        assert_eq!((state.is_reposted, state.reposts_count), (true, 1));
    }
}
