mod common;

use campus_feed_lib::application::services::PostCard;
use campus_feed_lib::domain::value_objects::CollectionKey;
use campus_feed_lib::shared::AppConfig;
use common::*;
use std::sync::Arc;

#[tokio::test]
async fn refetch_started_before_mutation_is_discarded() {
    let content = Arc::new(RecordingContentService::new());
    let h = harness(content, AppConfig::default());
    h.registry
        .set(CollectionKey::feed(), paged(vec![original("p", "alice", 2)]))
        .await;

    let ticket = h.registry.begin_refetch(CollectionKey::feed()).await;
    h.reconciler
        .toggle_like(&PostCard::new(original("p", "alice", 2)))
        .await;

    let stale = paged(vec![original("p", "alice", 2)]);
    assert!(!h.registry.complete_refetch(ticket, stale).await);
    assert_eq!(
        like_states(&h.registry, &CollectionKey::feed(), &id("p")).await,
        vec![(true, 3)]
    );
}

#[tokio::test]
async fn refetch_landed_before_mutation_is_patched_over() {
    let content = Arc::new(RecordingContentService::new());
    let h = harness(content, AppConfig::default());

    let ticket = h.registry.begin_refetch(CollectionKey::trending()).await;
    assert!(
        h.registry
            .complete_refetch(ticket, paged(vec![original("p", "alice", 7)]))
            .await
    );

    h.reconciler
        .toggle_like(&PostCard::new(original("p", "alice", 7)))
        .await;

    assert_eq!(
        like_states(&h.registry, &CollectionKey::trending(), &id("p")).await,
        vec![(true, 8)]
    );
}

/// 呼び出し中に新しく始まった再取得はバリアの後なので止められない。
/// 古いサーバー状態で楽観的な値が上書きされうる（既知の競合）。
#[tokio::test]
async fn refetch_started_mid_flight_can_overwrite_optimistic_patch() {
    let gate = Arc::new(Gate::default());
    let content = Arc::new(RecordingContentService::new().with_gate(gate.clone()));
    let h = harness(content, AppConfig::default());
    h.registry
        .set(CollectionKey::feed(), paged(vec![original("p", "alice", 2)]))
        .await;

    let card = PostCard::new(original("p", "alice", 2));
    let task = tokio::spawn({
        let reconciler = h.reconciler.clone();
        let card = card.clone();
        async move { reconciler.toggle_like(&card).await }
    });
    gate.wait_started().await;

    let ticket = h.registry.begin_refetch(CollectionKey::feed()).await;
    assert!(
        h.registry
            .complete_refetch(ticket, paged(vec![original("p", "alice", 2)]))
            .await
    );

    gate.release();
    assert!(task.await.unwrap().is_committed());

    assert_eq!(
        like_states(&h.registry, &CollectionKey::feed(), &id("p")).await,
        vec![(false, 2)]
    );
    let state = card.current().await.display_target().interaction;
    assert_eq!((state.is_liked, state.likes_count), (true, 3));
}
