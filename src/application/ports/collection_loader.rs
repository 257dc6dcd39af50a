use crate::domain::entities::CachedCollection;
use crate::domain::value_objects::CollectionKey;
use crate::shared::AppError;
use async_trait::async_trait;

/// コレクションをサーバーから取り直すためのポート
#[async_trait]
pub trait CollectionLoader: Send + Sync {
    async fn fetch(&self, key: &CollectionKey) -> Result<CachedCollection, AppError>;
}
