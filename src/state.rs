use crate::application::ports::{CollectionLoader, ContentService, Notifier};
use crate::application::services::{InteractionService, Reconciler, Viewer};
use crate::infrastructure::cache::CollectionRegistry;
use crate::shared::AppConfig;
use std::sync::Arc;
use tracing::info;

/// フィード画面全体で共有する状態
#[derive(Clone)]
pub struct FeedState {
    pub config: AppConfig,
    pub registry: CollectionRegistry,
    pub reconciler: Arc<Reconciler>,
    pub interactions: Arc<InteractionService>,
}

impl FeedState {
    pub fn new(
        config: AppConfig,
        content: Arc<dyn ContentService>,
        notifier: Arc<dyn Notifier>,
        loader: Option<Arc<dyn CollectionLoader>>,
        viewer: Viewer,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;

        let registry = CollectionRegistry::new();
        let mut reconciler =
            Reconciler::new(registry.clone(), content, notifier, config.clone());
        if let Some(loader) = loader {
            reconciler = reconciler.with_loader(loader);
        }
        let reconciler = Arc::new(reconciler);
        let interactions = Arc::new(InteractionService::new(Arc::clone(&reconciler), viewer));

        info!(
            delete_recovery = ?config.reconcile.delete_recovery,
            "feed state initialized"
        );

        Ok(Self {
            config,
            registry,
            reconciler,
            interactions,
        })
    }

    /// 環境変数から設定を読み込み、ログを初期化してから状態を組み立てる
    pub fn from_env(
        content: Arc<dyn ContentService>,
        notifier: Arc<dyn Notifier>,
        loader: Option<Arc<dyn CollectionLoader>>,
        viewer: Viewer,
    ) -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        crate::shared::logging::init(&config.logging);
        Self::new(config, content, notifier, loader, viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{LikeState, RepostRecord};
    use crate::domain::entities::CachedCollection;
    use crate::domain::value_objects::{CollectionKey, PostId};
    use crate::infrastructure::notifier::TracingNotifier;
    use crate::shared::AppError;
    use async_trait::async_trait;

    struct NoopContent;

    #[async_trait]
    impl ContentService for NoopContent {
        async fn toggle_like(&self, _post_id: &PostId) -> Result<Option<LikeState>, AppError> {
            Ok(None)
        }

        async fn repost(&self, _post_id: &PostId) -> Result<Option<RepostRecord>, AppError> {
            Ok(None)
        }

        async fn delete_post(&self, _post_id: &PostId) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_state_shares_registry_with_reconciler() {
        let state = FeedState::new(
            AppConfig::default(),
            Arc::new(NoopContent),
            Arc::new(TracingNotifier),
            None,
            Viewer::new("me"),
        )
        .unwrap();

        assert_eq!(state.interactions.viewer().user_id, "me");
        state
            .registry
            .set(CollectionKey::feed(), CachedCollection::paged(Vec::new()))
            .await;
        assert_eq!(state.reconciler.registry().len().await, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.logging.filter = " ".to_string();
        let result = FeedState::new(
            config,
            Arc::new(NoopContent),
            Arc::new(TracingNotifier),
            None,
            Viewer::new("me"),
        );
        assert!(result.is_err());
    }
}
