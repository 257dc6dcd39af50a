use crate::domain::value_objects::PostId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 投稿に埋め込まれる投稿者の要約情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// いいね・リポストの状態とカウンタ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub is_reposted: bool,
    #[serde(default)]
    pub reposts_count: u32,
    #[serde(default)]
    pub comments_count: u32,
}

impl InteractionState {
    pub fn toggled_like(self) -> Self {
        let is_liked = !self.is_liked;
        Self {
            is_liked,
            likes_count: step_counter(self.likes_count, is_liked),
            ..self
        }
    }

    pub fn toggled_repost(self) -> Self {
        let is_reposted = !self.is_reposted;
        Self {
            is_reposted,
            reposts_count: step_counter(self.reposts_count, is_reposted),
            ..self
        }
    }

    /// `other` のいいね状態だけを写し取る
    pub fn with_like_from(self, other: &InteractionState) -> Self {
        Self {
            is_liked: other.is_liked,
            likes_count: other.likes_count,
            ..self
        }
    }

    /// `other` のリポスト状態だけを写し取る
    pub fn with_repost_from(self, other: &InteractionState) -> Self {
        Self {
            is_reposted: other.is_reposted,
            reposts_count: other.reposts_count,
            ..self
        }
    }
}

// 0 未満にはしない
fn step_counter(count: u32, increment: bool) -> u32 {
    if increment {
        count.saturating_add(1)
    } else {
        count.saturating_sub(1)
    }
}

/// サーバーから受け取る投稿の JSON 形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: PostId,
    pub author_id: String,
    pub author: AuthorSummary,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_post_id: Option<PostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_post: Option<Box<PostRecord>>,
    #[serde(flatten)]
    pub interaction: InteractionState,
    pub created_at: DateTime<Utc>,
}

impl PostRecord {
    /// `quotedPostId` があり本文が空白のみの投稿はリポストの殻として扱う
    pub fn is_repost_shell(&self) -> bool {
        self.quoted_post_id.is_some() && self.content.trim().is_empty()
    }
}

/// 表示・操作の対象になる投稿本体
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author_id: String,
    pub author: AuthorSummary,
    pub content: String,
    pub media: Vec<String>,
    pub quoted_post_id: Option<PostId>,
    /// 引用投稿の埋め込み
    pub quoted: Option<Box<Post>>,
    pub interaction: InteractionState,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// 自身または埋め込まれた引用のいずれかが `id` か
    pub fn has_occurrence(&self, id: &PostId) -> bool {
        &self.id == id
            || self
                .quoted
                .as_deref()
                .is_some_and(|quoted| quoted.has_occurrence(id))
    }

    /// `id` に一致する全ての出現箇所に `transform` を適用する
    pub fn apply_to_occurrences(&mut self, id: &PostId, transform: &dyn Fn(&mut Post)) -> bool {
        let mut hit = false;
        if &self.id == id {
            transform(self);
            hit = true;
        }
        if let Some(quoted) = self.quoted.as_deref_mut() {
            hit |= quoted.apply_to_occurrences(id, transform);
        }
        hit
    }
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            author: record.author,
            content: record.content,
            media: record.media,
            quoted_post_id: record.quoted_post_id,
            quoted: record.quoted_post.map(|quoted| Box::new(Post::from(*quoted))),
            interaction: record.interaction,
            created_at: record.created_at,
        }
    }
}

impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author: post.author,
            content: post.content,
            media: post.media,
            quoted_post_id: post.quoted_post_id,
            quoted_post: post.quoted.map(|quoted| Box::new(PostRecord::from(*quoted))),
            interaction: post.interaction,
            created_at: post.created_at,
        }
    }
}

/// 引用投稿を包むだけのリポスト（本文なし）
#[derive(Debug, Clone, PartialEq)]
pub struct RepostShell {
    pub id: PostId,
    pub author_id: String,
    pub author: AuthorSummary,
    pub content: String,
    pub media: Vec<String>,
    /// 殻自身のカウンタ。表示には使われない
    pub interaction: InteractionState,
    pub created_at: DateTime<Utc>,
    pub quoted: Post,
}

/// キャッシュ上の投稿エントリ。
///
/// サーバーの生データから一度だけ分類し、以降の表示対象の解決はパターンマッチで行う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PostRecord", into = "PostRecord")]
pub enum FeedPost {
    Original(Post),
    RepostShell(RepostShell),
}

impl FeedPost {
    /// エントリ自身の ID（リポストの場合は殻の ID）
    pub fn id(&self) -> &PostId {
        match self {
            FeedPost::Original(post) => &post.id,
            FeedPost::RepostShell(shell) => &shell.id,
        }
    }

    /// エントリ自身の投稿者
    pub fn author_id(&self) -> &str {
        match self {
            FeedPost::Original(post) => &post.author_id,
            FeedPost::RepostShell(shell) => &shell.author_id,
        }
    }

    pub fn is_repost_shell(&self) -> bool {
        matches!(self, FeedPost::RepostShell(_))
    }

    pub fn display_target(&self) -> &Post {
        match self {
            FeedPost::Original(post) => post,
            FeedPost::RepostShell(shell) => &shell.quoted,
        }
    }

    pub fn display_target_mut(&mut self) -> &mut Post {
        match self {
            FeedPost::Original(post) => post,
            FeedPost::RepostShell(shell) => &mut shell.quoted,
        }
    }

    pub fn display_id(&self) -> &PostId {
        &self.display_target().id
    }

    pub fn has_occurrence(&self, id: &PostId) -> bool {
        match self {
            FeedPost::Original(post) => post.has_occurrence(id),
            FeedPost::RepostShell(shell) => shell.quoted.has_occurrence(id),
        }
    }

    /// `id` の出現箇所に `transform` を適用したコピーを返す。該当なしなら `None`
    pub fn patched(&self, id: &PostId, transform: &dyn Fn(&mut Post)) -> Option<FeedPost> {
        if !self.has_occurrence(id) {
            return None;
        }
        let mut next = self.clone();
        let hit = match &mut next {
            FeedPost::Original(post) => post.apply_to_occurrences(id, transform),
            FeedPost::RepostShell(shell) => shell.quoted.apply_to_occurrences(id, transform),
        };
        hit.then_some(next)
    }
}

/// 表示対象を解決する。殻なら引用先、それ以外は自身
pub fn resolve_display_target(post: &FeedPost) -> &Post {
    post.display_target()
}

impl From<PostRecord> for FeedPost {
    fn from(mut record: PostRecord) -> Self {
        if record.is_repost_shell() {
            if let Some(quoted) = record.quoted_post.take() {
                return FeedPost::RepostShell(RepostShell {
                    id: record.id,
                    author_id: record.author_id,
                    author: record.author,
                    content: record.content,
                    media: record.media,
                    interaction: record.interaction,
                    created_at: record.created_at,
                    quoted: Post::from(*quoted),
                });
            }
        }
        FeedPost::Original(Post::from(record))
    }
}

impl From<FeedPost> for PostRecord {
    fn from(post: FeedPost) -> Self {
        match post {
            FeedPost::Original(post) => PostRecord::from(post),
            FeedPost::RepostShell(shell) => {
                let quoted_id = shell.quoted.id.clone();
                PostRecord {
                    id: shell.id,
                    author_id: shell.author_id,
                    author: shell.author,
                    content: shell.content,
                    media: shell.media,
                    quoted_post_id: Some(quoted_id),
                    quoted_post: Some(Box::new(PostRecord::from(shell.quoted))),
                    interaction: shell.interaction,
                    created_at: shell.created_at,
                }
            }
        }
    }
}
