use super::post_card::PostCard;
use super::reconciler::{ReconcileOutcome, Reconciler};
use crate::application::ports::Notification;
use crate::domain::entities::{ActionKind, FeedPost};
use crate::domain::value_objects::CollectionKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// 操作しているユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub user_id: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Viewer {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }
}

/// 投稿カードのボタンから呼ばれる操作の窓口
pub struct InteractionService {
    reconciler: Arc<Reconciler>,
    viewer: Viewer,
}

impl InteractionService {
    pub fn new(reconciler: Arc<Reconciler>, viewer: Viewer) -> Self {
        Self { reconciler, viewer }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// 自分の投稿（リポストシェル経由を含む）はリポストできない
    pub fn can_repost(&self, post: &FeedPost) -> bool {
        post.display_target().author_id != self.viewer.user_id
    }

    /// エントリの作成者か管理者だけが削除できる
    pub fn can_delete(&self, post: &FeedPost) -> bool {
        self.viewer.is_admin || post.author_id() == self.viewer.user_id
    }

    pub async fn toggle_like(&self, card: &PostCard) -> ReconcileOutcome {
        self.reconciler.toggle_like(card).await
    }

    pub async fn toggle_repost(&self, card: &PostCard) -> ReconcileOutcome {
        let post = card.current().await;
        if !self.can_repost(&post) {
            debug!(post_id = %post.display_id(), "repost of own post rejected");
            self.reconciler.record_rejected();
            return ReconcileOutcome::Rejected;
        }

        let (outcome, confirmed) = self.reconciler.toggle_repost_confirmed(card).await;
        if let Some(confirmed) = confirmed {
            let reposted = confirmed.is_reposted;
            let notifications = &self.reconciler.config().notifications;
            let message = if reposted {
                notifications.repost_success_message.clone()
            } else {
                notifications.repost_removed_message.clone()
            };
            self.reconciler
                .notify(Notification::success(ActionKind::Repost, message))
                .await;
        }
        outcome
    }

    /// カードのエントリを削除する。`origin` はカードが表示されているコレクション
    pub async fn delete_post(
        &self,
        card: &PostCard,
        origin: Option<&CollectionKey>,
    ) -> ReconcileOutcome {
        let post = card.current().await;
        if !self.can_delete(&post) {
            debug!(post_id = %post.id(), "delete rejected for non-owner");
            self.reconciler.record_rejected();
            return ReconcileOutcome::Rejected;
        }
        self.reconciler.delete(post.id(), origin).await
    }
}
