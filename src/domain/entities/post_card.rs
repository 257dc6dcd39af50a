use super::post::{FeedPost, InteractionState};

/// 操作の種類。シングルフライトのキーにも使う
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Like,
    Repost,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::Repost => "repost",
            ActionKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 表示対象のいいねを反転したコピーを返す
pub fn apply_like_toggle(post: &FeedPost) -> FeedPost {
    let mut next = post.clone();
    let target = next.display_target_mut();
    target.interaction = target.interaction.toggled_like();
    next
}

/// 表示対象のリポストを反転したコピーを返す
pub fn apply_repost_toggle(post: &FeedPost) -> FeedPost {
    let mut next = post.clone();
    let target = next.display_target_mut();
    target.interaction = target.interaction.toggled_repost();
    next
}

/// `state` の該当フィールドだけを表示対象に書き込む
pub fn apply_interaction(post: &FeedPost, kind: ActionKind, state: &InteractionState) -> FeedPost {
    let mut next = post.clone();
    let target = next.display_target_mut();
    target.interaction = merge_interaction(target.interaction, kind, state);
    next
}

pub(crate) fn merge_interaction(
    current: InteractionState,
    kind: ActionKind,
    state: &InteractionState,
) -> InteractionState {
    match kind {
        ActionKind::Like => current.with_like_from(state),
        ActionKind::Repost => current.with_repost_from(state),
        ActionKind::Delete => current,
    }
}

/// カード単位の作業コピー
#[derive(Debug, Clone, PartialEq)]
pub struct PostCardState {
    /// 親リストから最後に渡された投稿
    pub canonical: FeedPost,
    /// 即時反映用のローカルコピー
    pub local: FeedPost,
}

impl PostCardState {
    pub fn new(post: FeedPost) -> Self {
        Self {
            canonical: post.clone(),
            local: post,
        }
    }

    /// 親データは常にローカルの編集に優先する
    pub fn sync_from_parent(&mut self, post: FeedPost) {
        self.canonical = post.clone();
        self.local = post;
    }

    pub fn restore(&mut self, snapshot: FeedPost) {
        self.local = snapshot;
    }
}
