//! Repository interfaces over the blog's storage.
//!
//! Every entity type has its own repository trait. The service builds one
//! [`Store`] at start-up and hands it to handlers through the router state.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
	model::{Author, Comment, NewComment, NewPost, Post, Tag},
	query::{PostQuery, TagQuery},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	/// A unique field already holds the value.
	#[error("{0} already exists")]
	Conflict(&'static str),
	/// A referenced post, tag or user does not exist.
	#[error("missing referenced row")]
	MissingReference,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[axum::async_trait]
pub trait PostRepository: Send + Sync {
	/// Runs a post query, returning posts in the query's order.
	async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>>;

	/// Counts the distinct users that liked a post.
	async fn count_likes(&self, post_id: Uuid) -> Result<i64>;

	async fn create(&self, post: NewPost) -> Result<Post>;

	/// Adds a user to the likes of a post. Liking twice is a no-op.
	async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<()>;

	/// Deletes a post along with its comments, likes and tag links.
	///
	/// Returns `false` if the post did not exist.
	async fn delete(&self, post_id: Uuid) -> Result<bool>;
}

#[axum::async_trait]
pub trait TagRepository: Send + Sync {
	/// Runs a tag query, returning tags in the query's order.
	async fn fetch(&self, query: &TagQuery) -> Result<Vec<Tag>>;

	/// Returns the tags of every given post, each annotated with its
	/// `posts_count` and sorted by title.
	///
	/// Posts without tags are absent from the map.
	async fn for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>>;

	async fn create(&self, title: String) -> Result<Tag>;
}

#[axum::async_trait]
pub trait CommentRepository: Send + Sync {
	/// Counts comments for every given post in a single aggregation.
	///
	/// Every existing post in `post_ids` is present in the map, posts
	/// without comments count zero.
	async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;

	/// Returns the comments of a post, oldest first.
	async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;

	async fn create(&self, comment: NewComment) -> Result<Comment>;
}

#[axum::async_trait]
pub trait AuthorRepository: Send + Sync {
	async fn by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Author>>;
}

/// The repositories used by request handlers.
#[derive(Clone)]
pub struct Store {
	pub posts: Arc<dyn PostRepository>,
	pub tags: Arc<dyn TagRepository>,
	pub comments: Arc<dyn CommentRepository>,
	pub authors: Arc<dyn AuthorRepository>,
}

impl Store {
	/// Creates a store where every repository is served by the same backend.
	pub fn from_backend<B>(backend: Arc<B>) -> Self
	where
		B: PostRepository + TagRepository + CommentRepository + AuthorRepository + 'static,
	{
		Self {
			posts: backend.clone(),
			tags: backend.clone(),
			comments: backend.clone(),
			authors: backend,
		}
	}
}
