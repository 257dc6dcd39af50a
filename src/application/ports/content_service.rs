use crate::domain::entities::InteractionState;
use crate::domain::value_objects::PostId;
use crate::shared::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// いいね操作に対するサーバーの応答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub is_liked: bool,
    pub likes_count: u32,
}

impl LikeState {
    pub fn as_interaction(&self) -> InteractionState {
        InteractionState {
            is_liked: self.is_liked,
            likes_count: self.likes_count,
            ..Default::default()
        }
    }
}

/// リポスト操作で作成された（または取り消された）レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepostRecord {
    pub id: PostId,
    pub quoted_post_id: PostId,
    pub is_reposted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts_count: Option<u32>,
}

impl RepostRecord {
    /// カウンタが返ってきた場合だけサーバー値として扱う
    pub fn as_interaction(&self) -> Option<InteractionState> {
        self.reposts_count.map(|reposts_count| InteractionState {
            is_reposted: self.is_reposted,
            reposts_count,
            ..Default::default()
        })
    }
}

/// 投稿の変更系 API を提供する外部コンテンツサービス
#[async_trait]
pub trait ContentService: Send + Sync {
    /// いいねをトグルする。応答にサーバー側の状態が含まれない場合は `None`
    async fn toggle_like(&self, post_id: &PostId) -> Result<Option<LikeState>, AppError>;

    /// リポストをトグルする
    async fn repost(&self, post_id: &PostId) -> Result<Option<RepostRecord>, AppError>;

    async fn delete_post(&self, post_id: &PostId) -> Result<(), AppError>;
}
