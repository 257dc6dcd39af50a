use super::post::{FeedPost, Post};
use crate::domain::value_objects::PostId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// 無限スクロールの 1 ページ分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<FeedPost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl PostPage {
    pub fn new(posts: Vec<FeedPost>, next_cursor: Option<String>) -> Self {
        Self { posts, next_cursor }
    }
}

/// キャッシュされたコレクションの形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CachedCollection {
    Paged { pages: Vec<Arc<PostPage>> },
    Single { post: FeedPost },
}

impl CachedCollection {
    pub fn paged(pages: Vec<PostPage>) -> Self {
        CachedCollection::Paged {
            pages: pages.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn single(post: FeedPost) -> Self {
        CachedCollection::Single { post }
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, CachedCollection::Paged { .. })
    }

    /// 表示順に全エントリを列挙する
    pub fn posts(&self) -> Vec<&FeedPost> {
        match self {
            CachedCollection::Paged { pages } => {
                pages.iter().flat_map(|page| page.posts.iter()).collect()
            }
            CachedCollection::Single { post } => vec![post],
        }
    }

    /// エントリ ID が一致するものを探す
    pub fn find(&self, id: &PostId) -> Option<&FeedPost> {
        self.posts().into_iter().find(|post| post.id() == id)
    }

    /// `id` の出現箇所を全て返す（殻や引用に埋め込まれたものも含む）
    pub fn occurrences(&self, id: &PostId) -> Vec<&Post> {
        let mut found = Vec::new();
        for entry in self.posts() {
            collect_occurrences(entry.display_target(), id, &mut found);
        }
        found
    }

    pub fn len(&self) -> usize {
        match self {
            CachedCollection::Paged { pages } => pages.iter().map(|page| page.posts.len()).sum(),
            CachedCollection::Single { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_occurrences<'a>(post: &'a Post, id: &PostId, found: &mut Vec<&'a Post>) {
    if &post.id == id {
        found.push(post);
    }
    if let Some(quoted) = post.quoted.as_deref() {
        collect_occurrences(quoted, id, found);
    }
}

/// 楽観的削除で取り除いたエントリと元の位置
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEntry {
    pub page_index: usize,
    pub position: usize,
    pub post: FeedPost,
}

/// 指定 ID の出現箇所に `transform` を適用した新しいスナップショットを返す。
///
/// - 入力が `None` なら `None`（何もしない）
/// - 該当のないページは同じ `Arc` のまま残し、何も一致しなければ入力の `Arc` をそのまま返す
pub fn patch_paged_or_single(
    collection: Option<&Arc<CachedCollection>>,
    post_id: &PostId,
    transform: &dyn Fn(&mut Post),
) -> Option<Arc<CachedCollection>> {
    let collection = collection?;

    match collection.as_ref() {
        CachedCollection::Paged { pages } => {
            let mut changed = false;
            let next_pages: Vec<Arc<PostPage>> = pages
                .iter()
                .map(|page| match patch_page(page, post_id, transform) {
                    Some(patched) => {
                        changed = true;
                        Arc::new(patched)
                    }
                    None => Arc::clone(page),
                })
                .collect();

            if changed {
                Some(Arc::new(CachedCollection::Paged { pages: next_pages }))
            } else {
                Some(Arc::clone(collection))
            }
        }
        CachedCollection::Single { post } => match post.patched(post_id, transform) {
            Some(patched) => Some(Arc::new(CachedCollection::Single { post: patched })),
            None => Some(Arc::clone(collection)),
        },
    }
}

fn patch_page(page: &PostPage, post_id: &PostId, transform: &dyn Fn(&mut Post)) -> Option<PostPage> {
    if !page.posts.iter().any(|post| post.has_occurrence(post_id)) {
        return None;
    }

    let posts = page
        .posts
        .iter()
        .map(|post| post.patched(post_id, transform).unwrap_or_else(|| post.clone()))
        .collect();

    Some(PostPage {
        posts,
        next_cursor: page.next_cursor.clone(),
    })
}

/// ページ形状のコレクションから `post_id` のエントリと、それを表示しているリポストの殻を取り除く。
///
/// 単一形状や該当なしの場合は `None`。
pub fn remove_from_paged(
    collection: &Arc<CachedCollection>,
    post_id: &PostId,
) -> Option<(Arc<CachedCollection>, Vec<RemovedEntry>)> {
    let CachedCollection::Paged { pages } = collection.as_ref() else {
        return None;
    };

    let mut removed = Vec::new();
    let next_pages: Vec<Arc<PostPage>> = pages
        .iter()
        .enumerate()
        .map(|(page_index, page)| {
            if !page.posts.iter().any(|post| removed_with(post, post_id)) {
                return Arc::clone(page);
            }
            let mut kept = Vec::with_capacity(page.posts.len());
            for (position, post) in page.posts.iter().enumerate() {
                if removed_with(post, post_id) {
                    removed.push(RemovedEntry {
                        page_index,
                        position,
                        post: post.clone(),
                    });
                } else {
                    kept.push(post.clone());
                }
            }
            Arc::new(PostPage {
                posts: kept,
                next_cursor: page.next_cursor.clone(),
            })
        })
        .collect();

    if removed.is_empty() {
        return None;
    }

    Some((Arc::new(CachedCollection::Paged { pages: next_pages }), removed))
}

fn removed_with(post: &FeedPost, post_id: &PostId) -> bool {
    post.id() == post_id || (post.is_repost_shell() && post.display_id() == post_id)
}

/// 取り除いたエントリを元の位置に戻す。
///
/// 位置は現在のページ長に丸める。既に同じ ID が存在する場合は二重に挿入しない。
pub fn reinsert_into_paged(
    collection: &Arc<CachedCollection>,
    removed: &[RemovedEntry],
) -> Arc<CachedCollection> {
    let CachedCollection::Paged { pages } = collection.as_ref() else {
        return Arc::clone(collection);
    };

    let existing: HashSet<&PostId> = pages
        .iter()
        .flat_map(|page| page.posts.iter().map(|post| post.id()))
        .collect();
    let mut next_pages: Vec<PostPage> = pages.iter().map(|page| (**page).clone()).collect();
    let mut touched = vec![false; next_pages.len()];

    // 元の位置の昇順で戻せば、前方の挿入で後続の位置がずれない
    let mut ordered: Vec<&RemovedEntry> = removed.iter().collect();
    ordered.sort_by_key(|entry| (entry.page_index, entry.position));

    for entry in ordered {
        if existing.contains(entry.post.id()) {
            continue;
        }
        if next_pages.is_empty() {
            next_pages.push(PostPage::new(Vec::new(), None));
            touched.push(true);
        }
        let page_index = entry.page_index.min(next_pages.len() - 1);
        let page = &mut next_pages[page_index];
        let position = entry.position.min(page.posts.len());
        page.posts.insert(position, entry.post.clone());
        touched[page_index] = true;
    }

    let rebuilt = next_pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| {
            if touched[index] {
                Arc::new(page)
            } else {
                Arc::clone(&pages[index])
            }
        })
        .collect();

    Arc::new(CachedCollection::Paged { pages: rebuilt })
}
