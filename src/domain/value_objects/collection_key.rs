use serde::{Deserialize, Serialize};
use std::fmt;

/// 投稿のコピーを保持しうる名前付きキャッシュコレクションの種類
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    Feed,
    UserPosts,
    CommunityPosts,
    GroupPosts,
    LikedPosts,
    TrendingPosts,
    Posts,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 7] = [
        CollectionKind::Feed,
        CollectionKind::UserPosts,
        CollectionKind::CommunityPosts,
        CollectionKind::GroupPosts,
        CollectionKind::LikedPosts,
        CollectionKind::TrendingPosts,
        CollectionKind::Posts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Feed => "feed",
            CollectionKind::UserPosts => "user-posts",
            CollectionKind::CommunityPosts => "community-posts",
            CollectionKind::GroupPosts => "group-posts",
            CollectionKind::LikedPosts => "liked-posts",
            CollectionKind::TrendingPosts => "trending-posts",
            CollectionKind::Posts => "posts",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// レジストリ上のコレクションを一意に指すキー。
///
/// 同じ種類でも対象ごとに別エントリになる（例: ユーザー別の `user-posts`、
/// 詳細画面用に投稿 ID でスコープした `posts`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionKey {
    pub kind: CollectionKind,
    pub scope: Option<String>,
}

impl CollectionKey {
    pub fn new(kind: CollectionKind) -> Self {
        Self { kind, scope: None }
    }

    pub fn scoped(kind: CollectionKind, scope: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
        }
    }

    pub fn feed() -> Self {
        Self::new(CollectionKind::Feed)
    }

    pub fn trending() -> Self {
        Self::new(CollectionKind::TrendingPosts)
    }

    pub fn liked() -> Self {
        Self::new(CollectionKind::LikedPosts)
    }

    pub fn user_posts(user_id: impl Into<String>) -> Self {
        Self::scoped(CollectionKind::UserPosts, user_id)
    }

    pub fn community_posts(community_id: impl Into<String>) -> Self {
        Self::scoped(CollectionKind::CommunityPosts, community_id)
    }

    pub fn group_posts(group_id: impl Into<String>) -> Self {
        Self::scoped(CollectionKind::GroupPosts, group_id)
    }

    pub fn post_detail(post_id: impl Into<String>) -> Self {
        Self::scoped(CollectionKind::Posts, post_id)
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{}", self.kind, scope),
            None => write!(f, "{}", self.kind),
        }
    }
}
