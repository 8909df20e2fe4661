use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::post_repository::{LikeOutcome, NewPost, PostPatch, PostRepository, ViewCountOutcome};
use crate::domain::error::DomainError;
use crate::domain::post::{Like, Post, PostStatus};
use crate::domain::query::{Page, PageInfo, PostQuery, SortField, SortOrder};

/// Store double whose operations each run under a single lock, so every
/// call is atomic the way a single-document store update is.
#[derive(Clone, Default)]
pub(crate) struct InMemoryPostRepository {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    posts: BTreeMap<i64, Post>,
    unavailable: bool,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// While set, every operation behaves like a store outage.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub(crate) fn get(&self, id: i64) -> Option<Post> {
        self.lock().posts.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    fn with_post<F>(&self, id: i64, mutate: F) -> Result<Option<Post>, DomainError>
    where
        F: FnOnce(&mut Post),
    {
        let mut state = self.lock();
        if state.unavailable {
            return Err(store_down());
        }
        Ok(state.posts.get_mut(&id).map(|post| {
            mutate(post);
            post.clone()
        }))
    }
}

fn store_down() -> DomainError {
    DomainError::Unexpected("store unavailable".to_string())
}

fn touch(post: &mut Post) {
    post.updated_at = Utc::now().max(post.updated_at);
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn matches_search(post: &Post, term: &str) -> bool {
    let mut haystack: Vec<String> = tokens(&post.title).collect();
    haystack.extend(post.tags.iter().flat_map(|tag| tokens(tag)));
    haystack.extend(post.excerpt.iter().flat_map(|excerpt| tokens(excerpt)));
    haystack.extend(tokens(&post.content));

    let mut needles = tokens(term).peekable();
    needles.peek().is_some() && needles.all(|needle| haystack.contains(&needle))
}

fn compare(a: &Post, b: &Post, field: SortField) -> Ordering {
    let primary = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::PublishedAt => compare_optional(a.published_at, b.published_at),
        SortField::Title => a.title.cmp(&b.title),
        SortField::ViewCount => a.view_count.cmp(&b.view_count),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn compare_optional(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(store_down());
        }
        if state.posts.values().any(|post| post.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }

        state.next_id += 1;
        let now = Utc::now();
        let post = Post {
            id: state.next_id,
            slug: input.slug,
            title: input.title,
            content: input.content,
            excerpt: input.excerpt,
            author_id: input.author_id,
            category_id: input.category_id,
            tags: input.tags,
            featured_image: input.featured_image,
            seo: input.seo,
            status: input.status,
            visibility: input.visibility,
            published_at: (input.status == PostStatus::Published).then_some(now),
            scheduled_for: None,
            view_count: 0,
            likes: Vec::new(),
            read_time: input.read_time,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.with_post(id, |_| {})
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let state = self.lock();
        if state.unavailable {
            return Err(store_down());
        }
        Ok(state.posts.values().find(|post| post.slug == slug).cloned())
    }

    async fn find_all(&self, query: &PostQuery) -> Page<Post> {
        let state = self.lock();
        if state.unavailable {
            return Page::empty(query);
        }

        let search = query.search_term();
        let mut matching: Vec<&Post> = state
            .posts
            .values()
            .filter(|post| query.status.is_none_or(|status| post.status == status))
            .filter(|post| search.is_none_or(|term| matches_search(post, term)))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Page {
            items,
            pagination: PageInfo::new(query.page, query.limit, total),
        }
    }

    async fn update_by_id(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        self.with_post(id, |post| {
            if let Some(title) = patch.title {
                post.title = title;
            }
            if let Some(content) = patch.content {
                post.content = content;
            }
            if let Some(read_time) = patch.read_time {
                post.read_time = read_time;
            }
            if let Some(excerpt) = patch.excerpt {
                post.excerpt = Some(excerpt);
            }
            if let Some(category_id) = patch.category_id {
                post.category_id = Some(category_id);
            }
            if let Some(tags) = patch.tags {
                post.tags = tags;
            }
            if let Some(image) = patch.featured_image {
                post.featured_image = Some(image);
            }
            if let Some(seo) = patch.seo {
                post.seo = Some(seo);
            }
            if let Some(status) = patch.status {
                post.status = status;
                if status == PostStatus::Published && post.published_at.is_none() {
                    post.published_at = Some(Utc::now());
                }
            }
            if let Some(visibility) = patch.visibility {
                post.visibility = visibility;
            }
            touch(post);
        })
    }

    async fn delete_by_id(&self, id: i64) -> bool {
        let mut state = self.lock();
        !state.unavailable && state.posts.remove(&id).is_some()
    }

    async fn increment_view_count(&self, id: i64) -> ViewCountOutcome {
        let mut state = self.lock();
        if state.unavailable {
            return ViewCountOutcome::StoreFailed;
        }
        match state.posts.get_mut(&id) {
            Some(post) => {
                post.view_count += 1;
                ViewCountOutcome::Incremented
            }
            None => ViewCountOutcome::PostMissing,
        }
    }

    async fn add_like(&self, post_id: i64, user_id: i64) -> LikeOutcome {
        let mut state = self.lock();
        if state.unavailable {
            return LikeOutcome::StoreFailed;
        }
        match state.posts.get_mut(&post_id) {
            None => LikeOutcome::PostMissing,
            Some(post) if post.is_liked_by(user_id) => LikeOutcome::Unchanged,
            Some(post) => {
                post.likes.push(Like {
                    user_id,
                    liked_at: Utc::now(),
                });
                LikeOutcome::Applied
            }
        }
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> LikeOutcome {
        let mut state = self.lock();
        if state.unavailable {
            return LikeOutcome::StoreFailed;
        }
        match state.posts.get_mut(&post_id) {
            None => LikeOutcome::PostMissing,
            Some(post) if !post.is_liked_by(user_id) => LikeOutcome::Unchanged,
            Some(post) => {
                post.likes.retain(|like| like.user_id != user_id);
                LikeOutcome::Applied
            }
        }
    }

    async fn schedule(
        &self,
        post_id: i64,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(store_down());
        }
        Ok(state
            .posts
            .get_mut(&post_id)
            .filter(|post| post.status != PostStatus::Archived)
            .map(|post| {
                post.status = PostStatus::Scheduled;
                post.scheduled_for = Some(scheduled_for);
                touch(post);
                post.clone()
            }))
    }

    async fn publish(&self, post_id: i64) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(store_down());
        }
        Ok(state
            .posts
            .get_mut(&post_id)
            .filter(|post| !matches!(post.status, PostStatus::Published | PostStatus::Archived))
            .map(|post| {
                post.status = PostStatus::Published;
                post.published_at = Some(Utc::now());
                touch(post);
                post.clone()
            }))
    }

    async fn archive(&self, post_id: i64) -> Result<Option<Post>, DomainError> {
        self.with_post(post_id, |post| {
            post.status = PostStatus::Archived;
            touch(post);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryPostRepository;
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::domain::post::{PostStatus, Visibility};
    use crate::domain::query::PostQuery;

    fn new_post(slug: &str, title: &str) -> NewPost {
        NewPost {
            slug: slug.to_string(),
            title: title.to_string(),
            content: "plain body text".to_string(),
            excerpt: None,
            author_id: 1,
            category_id: None,
            tags: vec!["rust".to_string()],
            featured_image: None,
            seo: None,
            status: PostStatus::Draft,
            visibility: Visibility::Public,
            read_time: 1,
        }
    }

    #[tokio::test]
    async fn search_without_word_tokens_matches_nothing() {
        let repo = InMemoryPostRepository::new();
        repo.create_post(new_post("first", "First post"))
            .await
            .expect("create must succeed");
        repo.create_post(new_post("second", "Second post"))
            .await
            .expect("create must succeed");

        let mut query = PostQuery::new(1, 10);
        query.search = "!!!".to_string();
        let page = repo.find_all(&query).await;
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 0);

        query.search = "second".to_string();
        let page = repo.find_all(&query).await;
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].slug, "second");
    }
}
