//! Query composition and aggregation over posts and tags.
//!
//! Queries are plain values built by chaining, then handed to a repository.
//! Counts that span a whole collection are computed with one aggregation per
//! collection instead of one query per row.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
	error::ContractError,
	model::Post,
	store::{self, CommentRepository, Store},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Store(#[from] store::Error),
	#[error(transparent)]
	Contract(#[from] ContractError),
}

/// Order in which posts are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
	/// Publication time descending.
	Newest,
	/// Publication time ascending.
	Oldest,
	/// Like count descending, ties broken by newest first and then by id.
	Popular,
}

/// A composable query over posts.
///
/// ```rust
/// let query = PostQuery::all().popular().limit(5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
	pub slug: Option<String>,
	pub tag_id: Option<Uuid>,
	pub year: Option<i32>,
	pub order: PostOrder,
	pub limit: Option<i64>,
}

impl PostQuery {
	/// Every post, newest first.
	pub fn all() -> Self {
		Self {
			slug: None,
			tag_id: None,
			year: None,
			order: PostOrder::Newest,
			limit: None,
		}
	}

	/// The post with the given slug.
	pub fn slug(slug: impl Into<String>) -> Self {
		Self {
			slug: Some(slug.into()),
			limit: Some(1),
			..Self::all()
		}
	}

	/// Posts filed under the given tag, newest first.
	pub fn tagged(tag_id: Uuid) -> Self {
		Self {
			tag_id: Some(tag_id),
			..Self::all()
		}
	}

	/// Annotates every post with `likes_count` and orders by it.
	#[must_use]
	pub fn popular(mut self) -> Self {
		self.order = PostOrder::Popular;
		self
	}

	#[must_use]
	pub fn newest(mut self) -> Self {
		self.order = PostOrder::Newest;
		self
	}

	/// Keeps posts published during `year` (UTC), oldest first.
	#[must_use]
	pub fn year(mut self, year: i32) -> Self {
		self.year = Some(year);
		self.order = PostOrder::Oldest;
		self
	}

	#[must_use]
	pub fn limit(mut self, limit: i64) -> Self {
		self.limit = Some(limit);
		self
	}

	/// Whether the query annotates `likes_count`.
	pub fn counts_likes(&self) -> bool {
		self.order == PostOrder::Popular
	}
}

/// Order in which tags are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOrder {
	Title,
	/// Post count descending, ties broken by title.
	Popular,
}

/// A composable query over tags.
///
/// Every tag returned carries its `posts_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
	pub titles: Option<Vec<String>>,
	pub order: TagOrder,
	pub limit: Option<i64>,
}

impl TagQuery {
	/// Every tag, by title.
	pub fn all() -> Self {
		Self {
			titles: None,
			order: TagOrder::Title,
			limit: None,
		}
	}

	/// The tags with any of the given titles.
	pub fn titled<I, S>(titles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			titles: Some(titles.into_iter().map(Into::into).collect()),
			..Self::all()
		}
	}

	#[must_use]
	pub fn popular(mut self) -> Self {
		self.order = TagOrder::Popular;
		self
	}

	#[must_use]
	pub fn limit(mut self, limit: i64) -> Self {
		self.limit = Some(limit);
		self
	}
}

/// Returns the UTC range `[start, end)` covering `year`.
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
	let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
	let end = Utc
		.with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0)
		.single()?;

	Some((start, end))
}

/// Attaches each post's tags and author, using one query for all tags and
/// one for all authors.
#[tracing::instrument(skip_all, fields(posts = posts.len()))]
pub async fn prefetch_tags_authors(store: &Store, posts: &mut [Post]) -> Result<(), Error> {
	let post_ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();
	let author_ids = posts
		.iter()
		.map(|post| post.author_id)
		.collect::<HashSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();

	let mut tags = store.tags.for_posts(&post_ids).await?;
	let authors = store.authors.by_ids(&author_ids).await?;

	for post in posts {
		post.tags = Some(tags.remove(&post.id).unwrap_or_default());
		post.author = authors.get(&post.author_id).cloned();
	}

	Ok(())
}

/// Attaches `comments_count` to every post, keeping the given order.
///
/// The counts come from a single aggregation keyed by the posts' ids. A post
/// that the aggregation does not report, for instance one deleted since it
/// was fetched, fails with [`ContractError::MissingCount`].
#[tracing::instrument(skip_all, fields(posts = posts.len()))]
pub async fn attach_comments_count(
	comments: &dyn CommentRepository,
	mut posts: Vec<Post>,
) -> Result<Vec<Post>, Error> {
	let post_ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();
	let count_for_id = comments.count_for_posts(&post_ids).await?;

	for post in &mut posts {
		let count = count_for_id
			.get(&post.id)
			.ok_or(ContractError::MissingCount(post.id))?;

		post.comments_count = Some(*count);
	}

	Ok(posts)
}

/// Runs a post query and returns its posts ready for serialization: tags and
/// author prefetched, `comments_count` attached.
///
/// Limits belong on the query, so counting only covers the posts that are
/// actually returned.
pub async fn fetch_with_comments_count(store: &Store, query: &PostQuery) -> Result<Vec<Post>, Error> {
	let mut posts = store.posts.fetch(query).await?;
	prefetch_tags_authors(store, &mut posts).await?;

	attach_comments_count(store.comments.as_ref(), posts).await
}
