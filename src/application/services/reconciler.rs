use super::post_card::PostCard;
use crate::application::ports::{CollectionLoader, ContentService, Notification, Notifier};
use crate::domain::entities::post_card::{apply_interaction, merge_interaction};
use crate::domain::entities::{
    ActionKind, FeedPost, InteractionState, Post, RemovedEntry, apply_like_toggle,
    apply_repost_toggle,
};
use crate::domain::value_objects::{CollectionKey, CollectionKind, PostId};
use crate::infrastructure::cache::CollectionRegistry;
use crate::infrastructure::metrics::{ReconcileMetrics, ReconcileMetricsSnapshot};
use crate::shared::config::{AppConfig, DeleteRecovery};
use crate::shared::AppError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// 1 回の楽観的更新の結末
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// リモート呼び出しが成功し、楽観的な状態を確定した
    Committed,
    /// リモート呼び出しが失敗し、ローカル状態を巻き戻した
    RolledBack(AppError),
    /// 同じ投稿・同じ操作が処理中のため無視した
    Ignored,
    /// 許可されていない操作のため送信しなかった
    Rejected,
}

impl ReconcileOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ReconcileOutcome::Committed)
    }
}

#[derive(Debug, Clone, Copy)]
enum Toggle {
    Like,
    Repost,
}

impl Toggle {
    fn kind(self) -> ActionKind {
        match self {
            Toggle::Like => ActionKind::Like,
            Toggle::Repost => ActionKind::Repost,
        }
    }

    fn apply(self, post: &FeedPost) -> FeedPost {
        match self {
            Toggle::Like => apply_like_toggle(post),
            Toggle::Repost => apply_repost_toggle(post),
        }
    }
}

type InFlightKey = (PostId, ActionKind);

/// 処理中の (投稿, 操作) を登録しておき、drop で解放する
struct InFlightGuard {
    key: InFlightKey,
    in_flight: Arc<Mutex<HashSet<InFlightKey>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.key);
    }
}

/// ローカルカードと全コレクションにまたがる楽観的更新を調停する
pub struct Reconciler {
    registry: CollectionRegistry,
    content: Arc<dyn ContentService>,
    notifier: Arc<dyn Notifier>,
    loader: Option<Arc<dyn CollectionLoader>>,
    config: AppConfig,
    metrics: ReconcileMetrics,
    in_flight: Arc<Mutex<HashSet<InFlightKey>>>,
}

impl Reconciler {
    pub fn new(
        registry: CollectionRegistry,
        content: Arc<dyn ContentService>,
        notifier: Arc<dyn Notifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            registry,
            content,
            notifier,
            loader: None,
            config,
            metrics: ReconcileMetrics::new(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// 削除失敗時の再取得に使うローダーを設定する
    pub fn with_loader(mut self, loader: Arc<dyn CollectionLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> ReconcileMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_in_flight(&self, post_id: &PostId, kind: ActionKind) -> bool {
        let in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.contains(&(post_id.clone(), kind))
    }

    pub(crate) fn record_rejected(&self) {
        self.metrics.record_rejected();
    }

    fn try_acquire(&self, post_id: &PostId, kind: ActionKind) -> Option<InFlightGuard> {
        let key = (post_id.clone(), kind);
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// 通知を送る。配送に失敗しても操作自体には影響させない
    pub async fn notify(&self, notification: Notification) {
        if !self.config.notifications.enabled {
            return;
        }
        if let Err(err) = self.notifier.notify(notification).await {
            warn!("failed to deliver notification: {err}");
        }
    }

    async fn barrier(&self) {
        if self.config.reconcile.cancel_refetch_on_mutation {
            self.registry.cancel_refetches(&CollectionKind::ALL).await;
        }
    }

    /// `post_id` の全出現箇所に `state` の該当フィールドを書き込む
    async fn write_collections(
        &self,
        post_id: &PostId,
        kind: ActionKind,
        state: InteractionState,
    ) -> usize {
        let transform = move |post: &mut Post| {
            post.interaction = merge_interaction(post.interaction, kind, &state);
        };
        let patched = self.registry.patch_post(post_id, &transform).await;
        self.metrics.record_collections_patched(patched.len());
        patched.len()
    }

    pub async fn toggle_like(&self, card: &PostCard) -> ReconcileOutcome {
        self.run_toggle(card, Toggle::Like).await.0
    }

    pub async fn toggle_repost(&self, card: &PostCard) -> ReconcileOutcome {
        self.run_toggle(card, Toggle::Repost).await.0
    }

    /// リポストをトグルし、確定した場合はその時点の状態も返す
    pub(crate) async fn toggle_repost_confirmed(
        &self,
        card: &PostCard,
    ) -> (ReconcileOutcome, Option<InteractionState>) {
        self.run_toggle(card, Toggle::Repost).await
    }

    async fn run_toggle(
        &self,
        card: &PostCard,
        toggle: Toggle,
    ) -> (ReconcileOutcome, Option<InteractionState>) {
        let kind = toggle.kind();
        let target_id = card.current().await.display_id().clone();

        let Some(_guard) = self.try_acquire(&target_id, kind) else {
            debug!(post_id = %target_id, action = %kind, "action already in flight; ignored");
            self.metrics.record_ignored();
            return (ReconcileOutcome::Ignored, None);
        };

        self.barrier().await;

        let (snapshot, patched) = card.apply(|post| toggle.apply(post)).await;
        let optimistic = patched.display_target().interaction;
        let collections = self.write_collections(&target_id, kind, optimistic).await;
        debug!(
            post_id = %target_id,
            action = %kind,
            collections,
            "applied optimistic update"
        );

        let result = match toggle {
            Toggle::Like => self
                .content
                .toggle_like(&target_id)
                .await
                .map(|state| state.map(|state| state.as_interaction())),
            Toggle::Repost => self
                .content
                .repost(&target_id)
                .await
                .map(|record| record.and_then(|record| record.as_interaction())),
        };

        match result {
            Ok(server_state) => {
                let mut confirmed = optimistic;
                if let Some(server_state) = server_state {
                    confirmed = merge_interaction(optimistic, kind, &server_state);
                    if confirmed != optimistic {
                        debug!(post_id = %target_id, action = %kind, "reconciling to server state");
                        card.apply(|post| apply_interaction(post, kind, &server_state))
                            .await;
                        self.write_collections(&target_id, kind, server_state).await;
                    }
                }
                info!(post_id = %target_id, action = %kind, "optimistic update committed");
                self.metrics.record_committed();
                (ReconcileOutcome::Committed, Some(confirmed))
            }
            Err(err) => {
                warn!(post_id = %target_id, action = %kind, "remote call failed, rolling back: {err}");
                card.rollback(kind, &snapshot, &patched).await;
                if self.config.reconcile.rollback_collections_on_failure {
                    self.write_collections(&target_id, kind, snapshot.display_target().interaction)
                        .await;
                }
                self.notify(Notification::error(kind, err.user_message()))
                    .await;
                self.metrics.record_rolled_back();
                (ReconcileOutcome::RolledBack(err), None)
            }
        }
    }

    /// 投稿を削除する。
    ///
    /// 起点のコレクション（`origin`）は確定まで残し、それ以外からは楽観的に取り除く。
    pub async fn delete(&self, post_id: &PostId, origin: Option<&CollectionKey>) -> ReconcileOutcome {
        let kind = ActionKind::Delete;
        let Some(_guard) = self.try_acquire(post_id, kind) else {
            debug!(post_id = %post_id, "delete already in flight; ignored");
            self.metrics.record_ignored();
            return ReconcileOutcome::Ignored;
        };

        self.barrier().await;

        let removed = self.registry.remove_post(post_id, origin).await;
        debug!(
            post_id = %post_id,
            collections = removed.len(),
            "optimistically removed post"
        );

        match self.content.delete_post(post_id).await {
            Ok(()) => {
                let confirmed = self.registry.remove_post(post_id, None).await;
                self.metrics
                    .record_collections_patched(removed.len() + confirmed.len());
                info!(post_id = %post_id, "post deleted");
                self.metrics.record_committed();
                ReconcileOutcome::Committed
            }
            Err(err) => {
                warn!(post_id = %post_id, "delete failed, recovering collections: {err}");
                self.recover_removed(removed).await;
                self.notify(Notification::error(kind, err.user_message()))
                    .await;
                self.metrics.record_rolled_back();
                ReconcileOutcome::RolledBack(err)
            }
        }
    }

    async fn recover_removed(&self, removed: Vec<(CollectionKey, Vec<RemovedEntry>)>) {
        match self.config.reconcile.delete_recovery {
            DeleteRecovery::Reinsert => {
                for (key, entries) in removed {
                    if !self.registry.reinsert(&key, &entries).await {
                        debug!(collection = %key, "collection evicted before reinsert");
                    }
                }
            }
            DeleteRecovery::Refetch => {
                for (key, _) in removed {
                    self.registry.invalidate(&key).await;
                    let Some(loader) = self.loader.as_ref() else {
                        continue;
                    };
                    let ticket = self.registry.begin_refetch(key.clone()).await;
                    match loader.fetch(&key).await {
                        Ok(collection) => {
                            self.registry.complete_refetch(ticket, collection).await;
                        }
                        Err(err) => {
                            warn!(collection = %key, "refetch after failed delete failed: {err}");
                        }
                    }
                }
            }
        }
    }
}
