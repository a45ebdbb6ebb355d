//! Builds the context of every page from the store.
//!
//! Each page runs a fixed set of queries. Collections are limited on the
//! query itself, before comment counts are attached.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::Serialize;

use crate::{
	error::ContractError,
	model::Tag,
	query::{self, PostQuery, TagQuery},
	serialize::{
		serialize_comment, serialize_post_detail, serialize_posts, serialize_tag, PostCard,
		PostDetail, TagCard,
	},
	store::{self, Store},
};

pub const POPULAR_POSTS: i64 = 5;
pub const FRESH_POSTS: i64 = 5;
pub const POPULAR_TAGS: i64 = 5;
pub const TAG_POSTS: i64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("unknown tag {0}")]
	UnknownTag(String),
	#[error(transparent)]
	Query(#[from] query::Error),
}

impl From<store::Error> for Error {
	fn from(error: store::Error) -> Self {
		Self::Query(error.into())
	}
}

impl From<ContractError> for Error {
	fn from(error: ContractError) -> Self {
		Self::Query(error.into())
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct HomeContext {
	pub most_popular_posts: Vec<PostCard>,
	/// The newest posts.
	pub page_posts: Vec<PostCard>,
	pub popular_tags: Vec<TagCard>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetailContext {
	pub post: PostDetail,
	pub popular_tags: Vec<TagCard>,
	pub most_popular_posts: Vec<PostCard>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TagFilterContext {
	/// Title of the selected tag.
	pub tag: String,
	pub popular_tags: Vec<TagCard>,
	/// The newest posts carrying the tag.
	pub posts: Vec<PostCard>,
	pub most_popular_posts: Vec<PostCard>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ArchiveContext {
	pub year: i32,
	/// Posts published during the year, oldest first.
	pub posts: Vec<PostCard>,
}

async fn post_cards(store: &Store, query: &PostQuery) -> Result<Vec<PostCard>, Error> {
	let posts = query::fetch_with_comments_count(store, query).await?;

	Ok(serialize_posts(&posts)?)
}

async fn most_popular_posts(store: &Store) -> Result<Vec<PostCard>, Error> {
	post_cards(store, &PostQuery::all().popular().limit(POPULAR_POSTS)).await
}

async fn popular_tags(store: &Store) -> Result<Vec<TagCard>, Error> {
	let tags = store
		.tags
		.fetch(&TagQuery::all().popular().limit(POPULAR_TAGS))
		.await?;

	Ok(tags.iter().map(serialize_tag).collect::<Result<_, _>>()?)
}

#[tracing::instrument(skip_all)]
pub async fn home(store: &Store) -> Result<HomeContext, Error> {
	Ok(HomeContext {
		most_popular_posts: most_popular_posts(store).await?,
		page_posts: post_cards(store, &PostQuery::all().newest().limit(FRESH_POSTS)).await?,
		popular_tags: popular_tags(store).await?,
	})
}

#[tracing::instrument(skip(store))]
pub async fn post_detail(store: &Store, slug: &str) -> Result<PostDetailContext, Error> {
	let mut posts = store.posts.fetch(&PostQuery::slug(slug)).await?;

	if posts.is_empty() {
		return Err(Error::UnknownPost(slug.into()));
	}

	query::prefetch_tags_authors(store, &mut posts).await?;
	let post = &posts[0];

	let comments = store.comments.for_post(post.id).await?;
	let author_ids = comments
		.iter()
		.map(|comment| comment.author_id)
		.collect::<HashSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();
	let authors = store.authors.by_ids(&author_ids).await?;
	let comments = comments
		.iter()
		.map(|comment| serialize_comment(comment, &authors))
		.collect::<Result<Vec<_>, _>>()?;

	let likes_amount = store.posts.count_likes(post.id).await?;

	Ok(PostDetailContext {
		post: serialize_post_detail(post, likes_amount, comments)?,
		popular_tags: popular_tags(store).await?,
		most_popular_posts: most_popular_posts(store).await?,
	})
}

#[tracing::instrument(skip(store))]
pub async fn tag_filter(store: &Store, title: &str) -> Result<TagFilterContext, Error> {
	let title = Tag::normalize_title(title);
	let tag = store
		.tags
		.fetch(&TagQuery::titled([title.as_str()]))
		.await?
		.into_iter()
		.next()
		.ok_or(Error::UnknownTag(title))?;

	Ok(TagFilterContext {
		popular_tags: popular_tags(store).await?,
		posts: post_cards(store, &PostQuery::tagged(tag.id).limit(TAG_POSTS)).await?,
		most_popular_posts: most_popular_posts(store).await?,
		tag: tag.title,
	})
}

#[tracing::instrument(skip(store))]
pub async fn archive(store: &Store, year: i32) -> Result<ArchiveContext, Error> {
	Ok(ArchiveContext {
		year,
		posts: post_cards(store, &PostQuery::all().year(year)).await?,
	})
}
