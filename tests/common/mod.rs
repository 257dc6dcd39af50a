#![allow(dead_code)]

use async_trait::async_trait;
use campus_feed_lib::application::ports::{
    CollectionLoader, ContentService, LikeState, Notification, RepostRecord,
};
use campus_feed_lib::application::services::Reconciler;
use campus_feed_lib::domain::entities::{
    ActionKind, AuthorSummary, CachedCollection, FeedPost, InteractionState, Post, PostPage,
    RepostShell,
};
use campus_feed_lib::domain::value_objects::{CollectionKey, PostId};
use campus_feed_lib::infrastructure::cache::CollectionRegistry;
use campus_feed_lib::infrastructure::notifier::ChannelNotifier;
use campus_feed_lib::shared::{AppConfig, AppError};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};

pub fn id(value: &str) -> PostId {
    PostId::new(value).unwrap()
}

pub fn author(user_id: &str) -> AuthorSummary {
    AuthorSummary {
        id: user_id.to_string(),
        username: user_id.to_string(),
        display_name: format!("User {user_id}"),
        avatar_url: None,
    }
}

pub fn post(post_id: &str, author_id: &str, likes: u32) -> Post {
    Post {
        id: id(post_id),
        author_id: author_id.to_string(),
        author: author(author_id),
        content: format!("post {post_id}"),
        media: Vec::new(),
        quoted_post_id: None,
        quoted: None,
        interaction: InteractionState {
            likes_count: likes,
            ..Default::default()
        },
        created_at: Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(),
    }
}

pub fn original(post_id: &str, author_id: &str, likes: u32) -> FeedPost {
    FeedPost::Original(post(post_id, author_id, likes))
}

/// `quoted` を本文なしで再共有したエントリ
pub fn shell(shell_id: &str, author_id: &str, quoted: Post) -> FeedPost {
    FeedPost::RepostShell(RepostShell {
        id: id(shell_id),
        author_id: author_id.to_string(),
        author: author(author_id),
        content: String::new(),
        media: Vec::new(),
        interaction: InteractionState::default(),
        created_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap(),
        quoted,
    })
}

/// 本文付きで `quoted` を引用したエントリ
pub fn quote(post_id: &str, author_id: &str, quoted: Post) -> FeedPost {
    let mut outer = post(post_id, author_id, 0);
    outer.content = format!("quoting {}", quoted.id);
    outer.quoted_post_id = Some(quoted.id.clone());
    outer.quoted = Some(Box::new(quoted));
    FeedPost::Original(outer)
}

pub fn paged(posts: Vec<FeedPost>) -> CachedCollection {
    CachedCollection::paged(vec![PostPage::new(posts, None)])
}

/// 同じ投稿 `id` の全出現箇所のいいね状態
pub async fn like_states(
    registry: &CollectionRegistry,
    key: &CollectionKey,
    post_id: &PostId,
) -> Vec<(bool, u32)> {
    let collection = registry.get(key).await.unwrap();
    collection
        .occurrences(post_id)
        .iter()
        .map(|post| (post.interaction.is_liked, post.interaction.likes_count))
        .collect()
}

/// リモート呼び出しを止めておくための関門
#[derive(Default)]
pub struct Gate {
    started: Notify,
    release: Notify,
}

impl Gate {
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }
}

/// 呼び出しを記録するだけのコンテンツサービス
#[derive(Default)]
pub struct RecordingContentService {
    calls: Mutex<Vec<(ActionKind, String)>>,
    failure: Option<AppError>,
    like_response: Option<LikeState>,
    gate: Option<Arc<Gate>>,
    only: Option<ActionKind>,
}

impl RecordingContentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: AppError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// 関門と失敗を `kind` の呼び出しだけに限定する
    pub fn only_for(mut self, kind: ActionKind) -> Self {
        self.only = Some(kind);
        self
    }

    pub fn with_like_response(mut self, state: LikeState) -> Self {
        self.like_response = Some(state);
        self
    }

    pub async fn calls(&self) -> Vec<(ActionKind, String)> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, kind: ActionKind, post_id: &PostId) -> Result<(), AppError> {
        self.calls.lock().await.push((kind, post_id.to_string()));
        if self.only.is_some_and(|only| only != kind) {
            return Ok(());
        }
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentService for RecordingContentService {
    async fn toggle_like(&self, post_id: &PostId) -> Result<Option<LikeState>, AppError> {
        self.record(ActionKind::Like, post_id).await?;
        Ok(self.like_response)
    }

    async fn repost(&self, post_id: &PostId) -> Result<Option<RepostRecord>, AppError> {
        self.record(ActionKind::Repost, post_id).await?;
        Ok(None)
    }

    async fn delete_post(&self, post_id: &PostId) -> Result<(), AppError> {
        self.record(ActionKind::Delete, post_id).await
    }
}

/// キーごとに固定のコレクションを返すローダー
#[derive(Default)]
pub struct StaticLoader {
    collections: HashMap<CollectionKey, CachedCollection>,
    fetched: Mutex<Vec<CollectionKey>>,
}

impl StaticLoader {
    pub fn with(mut self, key: CollectionKey, collection: CachedCollection) -> Self {
        self.collections.insert(key, collection);
        self
    }

    pub async fn fetched(&self) -> Vec<CollectionKey> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl CollectionLoader for StaticLoader {
    async fn fetch(&self, key: &CollectionKey) -> Result<CachedCollection, AppError> {
        self.fetched.lock().await.push(key.clone());
        self.collections
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("collection {key}")))
    }
}

pub struct Harness {
    pub registry: CollectionRegistry,
    pub reconciler: Arc<Reconciler>,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
}

pub fn harness(content: Arc<RecordingContentService>, config: AppConfig) -> Harness {
    let registry = CollectionRegistry::new();
    let (notifier, notifications) = ChannelNotifier::channel();
    let reconciler = Reconciler::new(registry.clone(), content, Arc::new(notifier), config);
    Harness {
        registry,
        reconciler: Arc::new(reconciler),
        notifications,
    }
}

impl Harness {
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut drained = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            drained.push(notification);
        }
        drained
    }
}
