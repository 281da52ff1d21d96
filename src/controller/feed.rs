//! Feed controller: posts, likes and comments.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Outcome, SingleFlight};
use crate::api::{validate_attachments, ApiClient, MediaFile, ProgressFn, UploadProgress};
use crate::errors::{ClientError, Result};
use crate::models::{Post, PostDraft};
use crate::reconcile::EntityList;
use crate::session::SessionAccessor;

/// Upload progress for one of several files, keyed by file name.
pub type FileProgressFn = Arc<dyn Fn(&str, UploadProgress) + Send + Sync>;

/// Posts shown in the feed and on a profile page, newest first.
pub struct FeedController {
    api: ApiClient,
    session: Arc<dyn SessionAccessor>,
    posts: RwLock<EntityList<Post>>,
    user_posts: RwLock<EntityList<Post>>,
    flights: SingleFlight,
}

impl FeedController {
    pub fn new(api: ApiClient, session: Arc<dyn SessionAccessor>) -> Self {
        Self {
            api,
            session,
            posts: RwLock::new(EntityList::new()),
            user_posts: RwLock::new(EntityList::new()),
            flights: SingleFlight::new(),
        }
    }

    /// Load the global feed.
    pub async fn load(&self) -> Result<usize> {
        let posts = self.api.list_posts().await.map_err(|e| {
            tracing::warn!("Failed to fetch posts: {}", e);
            e
        })?;
        let mut list = self.posts.write().await;
        list.replace_all(posts);
        Ok(list.len())
    }

    /// Load the posts of one user for a profile page. The feed is left as is.
    pub async fn load_for_user(&self, user_id: &str) -> Result<usize> {
        let posts = self.api.list_user_posts(user_id).await.map_err(|e| {
            tracing::warn!("Failed to fetch posts of {}: {}", user_id, e);
            e
        })?;
        let mut list = self.user_posts.write().await;
        list.replace_all(posts);
        Ok(list.len())
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.as_slice().to_vec()
    }

    pub async fn user_posts(&self) -> Vec<Post> {
        self.user_posts.read().await.as_slice().to_vec()
    }

    pub async fn post(&self, post_id: &str) -> Option<Post> {
        self.posts.read().await.get(post_id).cloned()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.flights.is_pending(key)
    }

    pub fn like_key(post_id: &str) -> String {
        format!("like:post:{}", post_id)
    }

    pub fn comment_like_key(post_id: &str, comment_id: &str) -> String {
        format!("like:comment:{}:{}", post_id, comment_id)
    }

    pub fn comment_key(post_id: &str) -> String {
        format!("comment:{}", post_id)
    }

    /// Like or unlike a post. The server decides which from its liker set and
    /// returns the updated post, which replaces the local copy.
    pub async fn toggle_like(&self, post_id: &str) -> Result<Outcome<Post>> {
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin(Self::like_key(post_id)) else {
            return Ok(Outcome::Busy);
        };

        let post = self.api.like_post(post_id).await.map_err(|e| {
            tracing::warn!("Failed to like post {}: {}", post_id, e);
            e
        })?;
        self.apply(post.clone()).await;
        Ok(Outcome::Applied(post))
    }

    pub async fn toggle_comment_like(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Outcome<Post>> {
        self.session.require_identity()?;
        let Some(_guard) = self
            .flights
            .try_begin(Self::comment_like_key(post_id, comment_id))
        else {
            return Ok(Outcome::Busy);
        };

        let post = self.api.like_comment(post_id, comment_id).await.map_err(|e| {
            tracing::warn!("Failed to like comment {} on {}: {}", comment_id, post_id, e);
            e
        })?;
        self.apply(post.clone()).await;
        Ok(Outcome::Applied(post))
    }

    /// Submit the comment typed into `draft`. The draft is cleared only once
    /// the server has accepted the comment.
    pub async fn submit_comment(&self, post_id: &str, draft: &mut String) -> Result<Outcome<Post>> {
        let content = draft.trim().to_string();
        if content.is_empty() {
            return Err(ClientError::Validation("Comment cannot be empty".to_string()));
        }
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin(Self::comment_key(post_id)) else {
            return Ok(Outcome::Busy);
        };

        let post = self.api.add_comment(post_id, &content).await.map_err(|e| {
            tracing::warn!("Failed to add comment to {}: {}", post_id, e);
            e
        })?;
        self.apply(post.clone()).await;
        draft.clear();
        Ok(Outcome::Applied(post))
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<Outcome<Post>> {
        self.session.require_identity()?;
        let Some(_guard) = self
            .flights
            .try_begin(format!("delete:comment:{}:{}", post_id, comment_id))
        else {
            return Ok(Outcome::Busy);
        };

        let post = self.api.delete_comment(post_id, comment_id).await.map_err(|e| {
            tracing::warn!("Failed to delete comment {} on {}: {}", comment_id, post_id, e);
            e
        })?;
        self.apply(post.clone()).await;
        Ok(Outcome::Applied(post))
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<Outcome<()>> {
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin(format!("delete:post:{}", post_id)) else {
            return Ok(Outcome::Busy);
        };

        self.api.delete_post(post_id).await.map_err(|e| {
            tracing::warn!("Failed to delete post {}: {}", post_id, e);
            e
        })?;
        self.posts.write().await.remove(post_id);
        self.user_posts.write().await.remove(post_id);
        Ok(Outcome::Applied(()))
    }

    /// Upload each file in order, then create the post and put it at the top
    /// of the feed.
    ///
    /// All files are validated before the first request, so one bad file means
    /// nothing is sent.
    pub async fn create_post(
        &self,
        draft: PostDraft,
        files: Vec<MediaFile>,
        progress: Option<FileProgressFn>,
    ) -> Result<Outcome<Post>> {
        if draft.content.trim().is_empty() && files.is_empty() {
            return Err(ClientError::Validation(
                "Please add content or media to your post".to_string(),
            ));
        }
        validate_attachments(0, &files)?;
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin("create:post") else {
            return Ok(Outcome::Busy);
        };

        let mut media_urls = Vec::with_capacity(files.len());
        for file in &files {
            let per_file: Option<ProgressFn> = progress.clone().map(|report| {
                let name = file.file_name.clone();
                Arc::new(move |p: UploadProgress| report(name.as_str(), p)) as ProgressFn
            });
            let url = self.api.upload(file, per_file).await.map_err(|e| {
                tracing::warn!("Failed to upload {}: {}", file.file_name, e);
                e
            })?;
            media_urls.push(url);
        }

        let post = self
            .api
            .create_post(&draft.into_request(media_urls))
            .await
            .map_err(|e| {
                tracing::warn!("Failed to create post: {}", e);
                e
            })?;
        self.posts.write().await.upsert(post.clone());
        tracing::info!("Created post {}", post.id);
        Ok(Outcome::Applied(post))
    }

    /// Replace the local copies with the server's. A post removed locally
    /// while the request was in flight stays removed.
    async fn apply(&self, post: Post) {
        let in_feed = self.posts.write().await.replace_existing(post.clone());
        let on_profile = self.user_posts.write().await.replace_existing(post);
        if !in_feed && !on_profile {
            tracing::debug!("Discarding update for a post no longer shown");
        }
    }
}
