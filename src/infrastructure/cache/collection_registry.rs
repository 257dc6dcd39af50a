use crate::domain::entities::{
    CachedCollection, Post, RemovedEntry, patch_paged_or_single, reinsert_into_paged,
    remove_from_paged,
};
use crate::domain::value_objects::{CollectionKey, CollectionKind, PostId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 進行中のバックグラウンド再取得を識別するチケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefetchTicket {
    pub key: CollectionKey,
    generation: u64,
}

#[derive(Default)]
struct RegistryState {
    collections: HashMap<CollectionKey, Arc<CachedCollection>>,
    in_flight: HashMap<CollectionKey, u64>,
    next_generation: u64,
    stale: HashSet<CollectionKey>,
}

/// 名前付きコレクションのレジストリ。
///
/// 更新は常にスナップショット単位の差し替えで行い、読み手が部分的に
/// 書き換わったコレクションを観測することはない。
#[derive(Clone, Default)]
pub struct CollectionRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// コレクションを登録（既存のものは置き換え）
    pub async fn set(&self, key: CollectionKey, collection: CachedCollection) {
        self.set_arc(key, Arc::new(collection)).await;
    }

    pub async fn set_arc(&self, key: CollectionKey, collection: Arc<CachedCollection>) {
        let mut state = self.state.write().await;
        state.collections.insert(key, collection);
    }

    pub async fn get(&self, key: &CollectionKey) -> Option<Arc<CachedCollection>> {
        let state = self.state.read().await;
        state.collections.get(key).cloned()
    }

    pub async fn remove(&self, key: &CollectionKey) -> Option<Arc<CachedCollection>> {
        let mut state = self.state.write().await;
        state.stale.remove(key);
        state.in_flight.remove(key);
        state.collections.remove(key)
    }

    pub async fn keys(&self) -> Vec<CollectionKey> {
        let state = self.state.read().await;
        state.collections.keys().cloned().collect()
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.collections.clear();
        state.in_flight.clear();
        state.stale.clear();
    }

    pub async fn len(&self) -> usize {
        let state = self.state.read().await;
        state.collections.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 登録済みの全コレクションで `post_id` の出現箇所に `transform` を適用する。
    ///
    /// 変更があったコレクションのキーを返す。
    pub async fn patch_post(
        &self,
        post_id: &PostId,
        transform: &(dyn Fn(&mut Post) + Sync),
    ) -> Vec<CollectionKey> {
        let mut state = self.state.write().await;
        let mut patched = Vec::new();

        for (key, collection) in state.collections.iter_mut() {
            let Some(next) = patch_paged_or_single(Some(&*collection), post_id, transform) else {
                continue;
            };
            if !Arc::ptr_eq(&next, collection) {
                *collection = next;
                patched.push(key.clone());
            }
        }

        debug!(
            post_id = %post_id,
            collections = patched.len(),
            "patched post across collections"
        );
        patched
    }

    /// ページ形状の全コレクションから `post_id` を取り除く（`except` は除外）
    pub async fn remove_post(
        &self,
        post_id: &PostId,
        except: Option<&CollectionKey>,
    ) -> Vec<(CollectionKey, Vec<RemovedEntry>)> {
        let mut state = self.state.write().await;
        let mut removed = Vec::new();

        for (key, collection) in state.collections.iter_mut() {
            if except == Some(key) {
                continue;
            }
            if let Some((next, entries)) = remove_from_paged(collection, post_id) {
                *collection = next;
                removed.push((key.clone(), entries));
            }
        }

        debug!(
            post_id = %post_id,
            collections = removed.len(),
            "removed post from collections"
        );
        removed
    }

    /// 取り除いたエントリを元の位置に戻す。コレクションが既にない場合は `false`
    pub async fn reinsert(&self, key: &CollectionKey, removed: &[RemovedEntry]) -> bool {
        let mut state = self.state.write().await;
        match state.collections.get_mut(key) {
            Some(collection) => {
                *collection = reinsert_into_paged(collection, removed);
                true
            }
            None => false,
        }
    }

    /// バックグラウンド再取得の開始を記録する
    pub async fn begin_refetch(&self, key: CollectionKey) -> RefetchTicket {
        let mut state = self.state.write().await;
        state.next_generation += 1;
        let generation = state.next_generation;
        state.in_flight.insert(key.clone(), generation);
        RefetchTicket { key, generation }
    }

    /// 再取得結果を反映する。途中で取り消されたチケットなら捨てて `false`
    pub async fn complete_refetch(
        &self,
        ticket: RefetchTicket,
        collection: CachedCollection,
    ) -> bool {
        let mut state = self.state.write().await;
        if state.in_flight.get(&ticket.key) != Some(&ticket.generation) {
            debug!(collection = %ticket.key, "dropped cancelled refetch result");
            return false;
        }
        state.in_flight.remove(&ticket.key);
        state.stale.remove(&ticket.key);
        state.collections.insert(ticket.key, Arc::new(collection));
        true
    }

    /// 指定種類の進行中の再取得を取り消す（ベストエフォート）。
    ///
    /// 既に反映済みの再取得には効果がない。取り消した件数を返す。
    pub async fn cancel_refetches(&self, kinds: &[CollectionKind]) -> usize {
        let mut state = self.state.write().await;
        let before = state.in_flight.len();
        state.in_flight.retain(|key, _| !kinds.contains(&key.kind));
        let cancelled = before - state.in_flight.len();
        if cancelled > 0 {
            debug!(cancelled, "cancelled in-flight refetches");
        }
        cancelled
    }

    pub async fn is_refetching(&self, key: &CollectionKey) -> bool {
        let state = self.state.read().await;
        state.in_flight.contains_key(key)
    }

    /// 次回の再取得対象として印を付ける
    pub async fn invalidate(&self, key: &CollectionKey) {
        let mut state = self.state.write().await;
        state.stale.insert(key.clone());
    }

    pub async fn is_stale(&self, key: &CollectionKey) -> bool {
        let state = self.state.read().await;
        state.stale.contains(key)
    }

    pub async fn stale_keys(&self) -> Vec<CollectionKey> {
        let state = self.state.read().await;
        state.stale.iter().cloned().collect()
    }
}
